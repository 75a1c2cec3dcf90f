// Queries: read-only operations

pub mod auth_queries;
pub mod check_in_queries;
pub mod event_queries;
pub mod registration_queries;
pub mod team_queries;
