//! External service module
//!
//! Thin shells around the operating system: desktop notifications and the
//! alert sound choice that travels with them.

pub mod notification;
pub mod sound;

// Re-export main functions
pub use notification::*;
pub use sound::AlertSound;
