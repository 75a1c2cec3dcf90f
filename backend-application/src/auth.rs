// Sessions, passwords and team-membership checks

pub mod guard;
pub mod password;
pub mod session;

pub use guard::*;
pub use password::*;
pub use session::*;
