//! Background tasks module
//!
//! The host loop that owns every timer, and the terminal reader feeding it.

pub mod host;
pub mod terminal_input;

// Re-export main functions
pub use host::{Host, HostOptions};
pub use terminal_input::spawn_terminal_input;
