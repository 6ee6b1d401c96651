pub mod action;
pub mod container;
pub mod entity_service;
pub mod error;
pub mod form;
pub mod routing;
pub mod store;

pub use action::*;
pub use container::*;
pub use entity_service::*;
pub use error::*;
pub use form::*;
pub use routing::*;
pub use store::*;
