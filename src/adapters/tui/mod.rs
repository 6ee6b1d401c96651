pub mod app;
pub mod event;
pub mod widgets;

pub use app::*;
pub use event::*;
