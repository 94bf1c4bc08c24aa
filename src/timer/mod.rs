//! Timer engine
//!
//! Pure logic for entering, mapping and counting down durations, and for
//! decoding remote commands. Nothing in here touches a terminal, a window or
//! the system clock directly.

pub mod command;
pub mod countdown;
pub mod dial;
pub mod format;
pub mod input;
pub mod keys;

// Re-export main types
pub use command::{Command, RemoteRequest};
pub use countdown::{CountdownClock, TickOutcome, TickSink};
pub use input::{DigitInput, DurationInputEngine, InputMode};
pub use keys::Key;
