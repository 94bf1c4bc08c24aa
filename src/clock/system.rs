//! Wall clock backed by tokio timers

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::{Clock, RepeatingTask, ScheduleHandle};

/// Production clock. Must be used from inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> ScheduleHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // No catch-up bursts after a late wakeup
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });

        debug!("Scheduled repeating task every {:?}", period);
        ScheduleHandle::new(move || handle.abort())
    }
}
