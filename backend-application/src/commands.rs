// Commands: operations that change state

pub mod auth_commands;
pub mod check_in_commands;
pub mod event_commands;
pub mod payment_commands;
pub mod registration_commands;
pub mod team_commands;
