pub mod health_service;
pub mod mailers;
pub mod notification_service;

pub use health_service::*;
pub use mailers::*;
pub use notification_service::*;
