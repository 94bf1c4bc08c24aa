//! Timer state and the snapshot published on every change

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Nothing entered
    #[default]
    Idle,
    /// A duration is entered but not started
    Armed,
    /// Counting down towards a deadline
    Running,
    /// Holding a remaining-time snapshot
    Paused,
}

impl TimerState {
    /// Idle or Armed depending on the displayed duration
    pub fn for_duration(seconds: f64) -> Self {
        if seconds > 0.0 {
            TimerState::Armed
        } else {
            TimerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TimerState::Paused)
    }

    /// Running or paused: a countdown is in progress
    pub fn is_active(&self) -> bool {
        self.is_running() || self.is_paused()
    }
}

/// What a host needs to draw one timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub seconds: f64,
    pub state: TimerState,
    pub deadline: Option<DateTime<Utc>>,
    pub time_label: String,
}

impl ClockSnapshot {
    pub fn idle(time_label: String) -> Self {
        Self {
            seconds: 0.0,
            state: TimerState::Idle,
            deadline: None,
            time_label,
        }
    }

    /// Whole minutes and leftover seconds of the displayed duration
    pub fn minutes_and_seconds(&self) -> (u32, u32) {
        let whole = self.seconds.max(0.0) as u32;
        (whole / 60, whole % 60)
    }
}
