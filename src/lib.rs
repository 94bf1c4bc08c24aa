//! Desk Timer - a keyboard-driven countdown timer
//!
//! The core enters durations digit by digit, maps them onto a nonlinear dial,
//! counts them down against absolute deadlines, and decodes remote commands.
//! A terminal host drives any number of independent timer windows.

pub mod clock;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use timer::{Command, CountdownClock, DurationInputEngine, RemoteRequest};
pub use utils::signals::shutdown_signal;
