pub mod client;
pub mod rest_repository;

pub use client::*;
pub use rest_repository::*;
