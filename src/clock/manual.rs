//! Hand-driven clock for deterministic tests

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use super::{Clock, RepeatingTask, ScheduleHandle};

struct Scheduled {
    id: u64,
    period: chrono::Duration,
    next_due: DateTime<Utc>,
    // Taken out while the task runs so it can call back into the clock
    task: Option<RepeatingTask>,
}

struct ManualState {
    now: DateTime<Utc>,
    next_id: u64,
    schedules: Vec<Scheduled>,
}

/// A clock whose time only moves when told to.
///
/// [`advance`](ManualClock::advance) fires every schedule at its exact due
/// instant. [`skip`](ManualClock::skip) moves time without firing anything,
/// modelling a stalled scheduler; [`run_due`](ManualClock::run_due) then
/// delivers the late firings.
#[derive(Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                now: start,
                next_id: 0,
                schedules: Vec::new(),
            })),
        }
    }

    /// A clock starting at a fixed, arbitrary instant
    pub fn at_epoch() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        Self::new(start)
    }

    /// Move time forward, running each schedule at every due instant
    pub fn advance(&self, by: Duration) {
        let target = self.now() + to_chrono(by);
        while let Some(id) = self.next_due_before(target) {
            self.run_one(id, None);
        }
        self.state().now = target;
    }

    /// Move time forward without running any schedule
    pub fn skip(&self, by: Duration) {
        let mut state = self.state();
        state.now += to_chrono(by);
    }

    /// Run every overdue schedule once, at the current instant
    pub fn run_due(&self) {
        let now = self.now();
        let due: Vec<u64> = self
            .state()
            .schedules
            .iter()
            .filter(|s| s.next_due <= now)
            .map(|s| s.id)
            .collect();
        for id in due {
            self.run_one(id, Some(now));
        }
    }

    /// Number of schedules that have not been cancelled
    pub fn active_schedules(&self) -> usize {
        self.state().schedules.len()
    }

    fn next_due_before(&self, target: DateTime<Utc>) -> Option<u64> {
        self.state()
            .schedules
            .iter()
            .filter(|s| s.next_due <= target)
            .min_by_key(|s| (s.next_due, s.id))
            .map(|s| s.id)
    }

    fn run_one(&self, id: u64, late_at: Option<DateTime<Utc>>) {
        let task = {
            let mut state = self.state();
            let Some(entry) = state.schedules.iter_mut().find(|s| s.id == id) else {
                return;
            };
            let fired_at = late_at.unwrap_or(entry.next_due);
            entry.next_due = fired_at + entry.period;
            let task = entry.task.take();
            state.now = state.now.max(fired_at);
            task
        };

        let Some(mut task) = task else { return };
        task();

        // The task may have cancelled its own schedule
        if let Some(entry) = self.state().schedules.iter_mut().find(|s| s.id == id) {
            entry.task = Some(task);
        }
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.state().now
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> ScheduleHandle {
        let period = to_chrono(period.max(Duration::from_millis(1)));
        let id = {
            let mut state = self.state();
            let id = state.next_id;
            state.next_id += 1;
            let next_due = state.now + period;
            state.schedules.push(Scheduled {
                id,
                period,
                next_due,
                task: Some(task),
            });
            id
        };

        let inner = Arc::clone(&self.inner);
        ScheduleHandle::new(move || {
            let mut state = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.schedules.retain(|s| s.id != id);
        })
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ManualClock")
            .field("now", &state.now)
            .field("schedules", &state.schedules.len())
            .finish()
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
