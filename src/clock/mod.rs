//! Time and scheduling capability
//!
//! Countdown logic never sleeps or reads the system time directly. It asks an
//! injected [`Clock`] for the current instant and for repeating schedules, so
//! the same code runs against tokio timers in the binary and against
//! [`ManualClock`] in tests.

pub mod manual;
pub mod system;

use std::time::Duration;

use chrono::{DateTime, Utc};

pub use manual::ManualClock;
pub use system::SystemClock;

/// A repeating task handed to [`Clock::schedule_repeating`]
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Source of wall-clock time and repeating schedules
pub trait Clock: Send + Sync {
    /// Current wall-clock instant
    fn now(&self) -> DateTime<Utc>;

    /// Run `task` every `interval` until the returned handle is cancelled or
    /// dropped. The first run happens one interval from now.
    fn schedule_repeating(&self, interval: Duration, task: RepeatingTask) -> ScheduleHandle;
}

/// Cancels a repeating schedule; dropping the handle cancels too
pub struct ScheduleHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl ScheduleHandle {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// Stop the schedule now. No task run starts after this returns.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Which of a countdown's two schedules produced a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// ~1 Hz refresh of the remaining time while running
    Countdown,
    /// ~1 Hz refresh of the wall-clock label while not running
    Maintenance,
}

/// One firing of a schedule, tagged with the generation it was armed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub kind: TickKind,
    pub generation: u64,
}
