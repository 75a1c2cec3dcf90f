// Backend Application Layer

pub mod auth;
pub mod check_in_payload;
pub mod commands;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
