//! Deadline-based countdown state machine
//!
//! While running, the remaining time is always recomputed from an absolute
//! deadline, never decremented. A late or skipped tick therefore corrects
//! itself on the next one, and completion lands on wall-clock time no matter
//! how the scheduler behaves.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::clock::{Clock, ScheduleHandle, Tick, TickKind};
use crate::state::{ClockSnapshot, TimerState};
use crate::timer::{command::MAX_REMOTE_SECONDS, format};

/// Cadence of the remaining-time refresh
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Cadence of the wall-clock label refresh
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);

/// Where schedule firings are delivered. The host routes them back to
/// [`CountdownClock::tick`] on its own execution context.
pub type TickSink = Arc<dyn Fn(Tick) + Send + Sync>;

/// Called once per Running to Idle completion
pub type CompletionHandler = Box<dyn FnMut() + Send>;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Stale, or not expected in the current state
    Ignored,
    /// Remaining seconds were republished
    Updated(f64),
    /// The countdown reached zero on this tick
    Completed,
    /// Wall-clock maintenance ran
    Maintained,
}

#[derive(Debug)]
struct ActiveSchedule {
    generation: u64,
    _handle: ScheduleHandle,
}

/// One timer's countdown, owned by exactly one window
pub struct CountdownClock {
    clock: Arc<dyn Clock>,
    sink: TickSink,
    seconds: f64,
    state: TimerState,
    deadline: Option<DateTime<Utc>>,
    paused_remaining: Option<f64>,
    last_duration: Option<f64>,
    wall_time: DateTime<Utc>,
    visible: bool,
    next_generation: u64,
    countdown: Option<ActiveSchedule>,
    maintenance: Option<ActiveSchedule>,
    on_complete: Option<CompletionHandler>,
    snapshot_tx: watch::Sender<ClockSnapshot>,
}

impl CountdownClock {
    pub fn new(clock: Arc<dyn Clock>, sink: TickSink) -> Self {
        let wall_time = clock.now();
        let (snapshot_tx, _) = watch::channel(ClockSnapshot::idle(format::time_label(wall_time)));

        Self {
            clock,
            sink,
            seconds: 0.0,
            state: TimerState::Idle,
            deadline: None,
            paused_remaining: None,
            last_duration: None,
            wall_time,
            visible: false,
            next_generation: 0,
            countdown: None,
            maintenance: None,
            on_complete: None,
            snapshot_tx,
        }
    }

    /// Register the completion handler, replacing any previous one
    pub fn on_complete<F>(&mut self, handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(handler));
    }

    /// Watch every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ClockSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn last_duration(&self) -> Option<f64> {
        self.last_duration
    }

    /// Unrounded time left: from the deadline while running, from the
    /// snapshot while paused, the displayed value otherwise
    pub fn remaining(&self) -> f64 {
        match (self.state, self.deadline, self.paused_remaining) {
            (TimerState::Running, Some(deadline), _) => self.seconds_until(deadline).max(0.0),
            (TimerState::Paused, _, Some(snapshot)) => snapshot,
            _ => self.seconds,
        }
    }

    /// `HH:MM` of the deadline while running, of the wall clock otherwise
    pub fn time_label(&self) -> String {
        match (self.state, self.deadline) {
            (TimerState::Running, Some(deadline)) => format::time_label(deadline),
            _ => format::time_label(self.wall_time),
        }
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            seconds: self.seconds,
            state: self.state,
            deadline: self.deadline,
            time_label: self.time_label(),
        }
    }

    /// Show a new duration, clamped to 24 hours. Any countdown in progress is
    /// abandoned.
    pub fn set_duration(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() {
            seconds.clamp(0.0, MAX_REMOTE_SECONDS)
        } else {
            0.0
        };

        self.cancel_countdown();
        self.paused_remaining = None;
        self.deadline = None;
        self.seconds = seconds;
        self.state = TimerState::for_duration(seconds);
        self.ensure_maintenance();

        debug!("Duration set to {}s ({:?})", seconds, self.state);
        self.publish();
    }

    /// Arm a deadline from the displayed duration. Returns false when there is
    /// nothing to count down or the timer is not armed.
    pub fn start(&mut self) -> bool {
        if self.seconds <= 0.0 {
            debug!("Ignoring start with no duration");
            return false;
        }
        if self.state != TimerState::Armed {
            debug!("Ignoring start while {:?}", self.state);
            return false;
        }

        if !self.run_for(self.seconds) {
            return false;
        }
        self.last_duration = Some(self.seconds);
        debug!("Countdown started for {}s", self.seconds);
        true
    }

    pub fn pause(&mut self) -> bool {
        let Some(deadline) = self.deadline.filter(|_| self.state.is_running()) else {
            return false;
        };

        let remaining = self.seconds_until(deadline).max(0.0);
        self.cancel_countdown();
        self.deadline = None;
        self.paused_remaining = Some(remaining);
        self.seconds = remaining.round();
        self.state = TimerState::Paused;
        self.ensure_maintenance();

        debug!("Countdown paused with {:.3}s remaining", remaining);
        self.publish();
        true
    }

    pub fn resume(&mut self) -> bool {
        let Some(remaining) = self.paused_remaining.filter(|_| self.state.is_paused()) else {
            return false;
        };

        if !self.run_for(remaining) {
            return false;
        }
        self.paused_remaining = None;
        debug!("Countdown resumed with {:.3}s remaining", remaining);
        true
    }

    /// Pause a running countdown or resume a paused one
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Paused => self.resume(),
            _ => false,
        }
    }

    /// Enter, Space or a click: toggle pause, or start an armed timer
    pub fn confirm(&mut self) -> bool {
        match self.state {
            TimerState::Armed => self.start(),
            _ => self.toggle_pause(),
        }
    }

    /// Abandon a running or paused countdown
    pub fn stop(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.clear();
        debug!("Countdown stopped");
        true
    }

    /// Clear the timer from any state
    pub fn reset(&mut self) {
        self.clear();
        debug!("Timer reset");
    }

    /// Start again with the last started duration
    pub fn restart_last(&mut self) -> bool {
        if self.state.is_active() {
            return false;
        }
        let Some(last) = self.last_duration else {
            return false;
        };

        self.set_duration(last);
        self.start()
    }

    /// Keep the wall-clock label fresh while this timer is on screen
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            if !self.state.is_running() {
                self.wall_time = self.clock.now();
                self.publish();
            }
            self.ensure_maintenance();
        } else {
            self.maintenance = None;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Deliver one schedule firing
    pub fn tick(&mut self, tick: Tick) -> TickOutcome {
        match tick.kind {
            TickKind::Countdown => self.countdown_tick(tick.generation),
            TickKind::Maintenance => self.maintenance_tick(tick.generation),
        }
    }

    /// Generation of the live countdown schedule, if any
    pub fn countdown_generation(&self) -> Option<u64> {
        self.countdown.as_ref().map(|s| s.generation)
    }

    /// Generation of the live maintenance schedule, if any
    pub fn maintenance_generation(&self) -> Option<u64> {
        self.maintenance.as_ref().map(|s| s.generation)
    }

    fn countdown_tick(&mut self, generation: u64) -> TickOutcome {
        if self.countdown_generation() != Some(generation) || !self.state.is_running() {
            return TickOutcome::Ignored;
        }
        let Some(deadline) = self.deadline else {
            return TickOutcome::Ignored;
        };

        let remaining = self.seconds_until(deadline).round().max(0.0);
        self.seconds = remaining;

        if remaining > 0.0 {
            self.publish();
            return TickOutcome::Updated(remaining);
        }

        self.clear();
        debug!("Countdown complete");
        if let Some(handler) = self.on_complete.as_mut() {
            handler();
        }
        TickOutcome::Completed
    }

    fn maintenance_tick(&mut self, generation: u64) -> TickOutcome {
        if self.maintenance_generation() != Some(generation) || self.state.is_running() {
            return TickOutcome::Ignored;
        }

        let now = self.clock.now();
        if now.second() == 0 {
            self.wall_time = now;
            self.publish();
        }
        TickOutcome::Maintained
    }

    /// Returns false, changing nothing, when the deadline is not representable
    fn run_for(&mut self, seconds: f64) -> bool {
        let Some(deadline) = to_chrono(seconds).and_then(|d| self.clock.now().checked_add_signed(d))
        else {
            warn!("Cannot schedule a deadline {}s from now", seconds);
            return false;
        };

        self.deadline = Some(deadline);
        self.state = TimerState::Running;
        self.maintenance = None;
        let schedule = self.schedule(TickKind::Countdown, TICK_INTERVAL);
        self.countdown = Some(schedule);
        self.publish();
        true
    }

    fn clear(&mut self) {
        self.cancel_countdown();
        self.deadline = None;
        self.paused_remaining = None;
        self.seconds = 0.0;
        self.state = TimerState::Idle;
        self.ensure_maintenance();
        self.publish();
    }

    fn cancel_countdown(&mut self) {
        self.countdown = None;
    }

    /// Maintenance runs only while visible and not counting down
    fn ensure_maintenance(&mut self) {
        if self.visible && !self.state.is_running() && self.maintenance.is_none() {
            let schedule = self.schedule(TickKind::Maintenance, MAINTENANCE_INTERVAL);
            self.maintenance = Some(schedule);
        }
    }

    fn schedule(&mut self, kind: TickKind, interval: Duration) -> ActiveSchedule {
        self.next_generation += 1;
        let generation = self.next_generation;
        let sink = Arc::clone(&self.sink);
        let handle = self
            .clock
            .schedule_repeating(interval, Box::new(move || sink(Tick { kind, generation })));
        ActiveSchedule { generation, _handle: handle }
    }

    fn seconds_until(&self, instant: DateTime<Utc>) -> f64 {
        (instant - self.clock.now()).num_milliseconds() as f64 / 1000.0
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl std::fmt::Debug for CountdownClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownClock")
            .field("seconds", &self.seconds)
            .field("state", &self.state)
            .field("deadline", &self.deadline)
            .field("paused_remaining", &self.paused_remaining)
            .field("last_duration", &self.last_duration)
            .field("visible", &self.visible)
            .finish()
    }
}

fn to_chrono(seconds: f64) -> Option<chrono::Duration> {
    chrono::Duration::try_milliseconds((seconds * 1000.0).round() as i64)
}
