//! Terminal rendering surface for the assistant panel

mod app;
mod events;
mod markdown;

pub use app::{run, App, InputMode, ResponsePane};
pub use events::{Event, EventHandler};
pub use markdown::render_markdown;
