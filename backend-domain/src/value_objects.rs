// Domain value objects
pub mod attendee_role;
pub mod event_status;
pub mod identifiers;
pub mod payment_method;
pub mod payment_status;

pub use attendee_role::*;
pub use event_status::*;
pub use identifiers::*;
pub use payment_method::*;
pub use payment_status::*;

use thiserror::Error;

/// Raised when a wire string does not name any variant of an enum value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
