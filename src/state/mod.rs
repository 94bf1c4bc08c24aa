//! State management module
//!
//! Per-window timer state, the window registry owned by the host loop, and
//! the events that drive it.

pub mod app_state;
pub mod event;
pub mod timer_state;
pub mod window;

// Re-export main types
pub use app_state::AppState;
pub use event::HostEvent;
pub use timer_state::{ClockSnapshot, TimerState};
pub use window::{TimerWindow, WindowId, WindowStatus};
