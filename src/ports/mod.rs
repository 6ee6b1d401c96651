pub mod config_store;
pub mod entity_repository;

pub use config_store::*;
pub use entity_repository::*;
