// Domain entities
pub mod account;
pub mod config;
pub mod event;
pub mod notification;
pub mod registration;

pub use account::*;
pub use config::*;
pub use event::*;
pub use notification::*;
pub use registration::*;
