// Domain services: pure rules over entities

pub mod attendance;
pub mod payment_lifecycle;
pub mod registration_validation;

pub use attendance::*;
pub use payment_lifecycle::*;
pub use registration_validation::*;
