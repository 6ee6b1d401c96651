pub mod comment;
pub mod criteria;
pub mod datetime;
pub mod entity;
pub mod error;
pub mod message;
pub mod project;
pub mod status;
pub mod task;
pub mod user_info;

pub use comment::*;
pub use criteria::*;
pub use entity::*;
pub use error::*;
pub use message::*;
pub use project::*;
pub use status::*;
pub use task::*;
pub use user_info::*;
