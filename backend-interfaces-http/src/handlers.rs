use std::str::FromStr;

use crate::error::HttpError;

pub mod auth_handlers;
pub mod check_in_handlers;
pub mod event_handlers;
pub mod ops_handlers;
pub mod registration_handlers;
pub mod team_handlers;

pub use auth_handlers::*;
pub use check_in_handlers::*;
pub use event_handlers::*;
pub use ops_handlers::*;
pub use registration_handlers::*;
pub use team_handlers::*;

/// A path id that does not parse cannot name a stored row.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, HttpError> {
    raw.parse::<T>().map_err(|_| HttpError::not_found(what))
}
