//! Display strings for labels, badge and screen readers

use chrono::{DateTime, Local, Utc};

use crate::state::{ClockSnapshot, TimerState};

/// Large label: `45"` under a minute, `12'` otherwise
pub fn minutes_display(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{}\"", seconds as i64)
    } else {
        format!("{}'", (seconds / 60.0).floor() as i64)
    }
}

/// Small label under the minutes: empty under a minute, `30"` otherwise
pub fn seconds_display(seconds: f64) -> String {
    if seconds < 60.0 {
        String::new()
    } else {
        format!("{}\"", (seconds % 60.0) as i64)
    }
}

/// Dock badge text
pub fn badge_string(minutes: u32, seconds: u32) -> String {
    format!("{:02}:{:02}", minutes, seconds)
}

pub fn accessibility_time_description(minutes: u32, seconds: u32) -> String {
    fn unit(value: u32, name: &str) -> String {
        if value == 1 {
            format!("{} {}", value, name)
        } else {
            format!("{} {}s", value, name)
        }
    }

    match (minutes, seconds) {
        (0, s) => unit(s, "second"),
        (m, 0) => unit(m, "minute"),
        (m, s) => format!("{} {}", unit(m, "minute"), unit(s, "second")),
    }
}

/// Spoken value of a timer
pub fn accessibility_value(snapshot: &ClockSnapshot) -> String {
    if snapshot.seconds <= 0.0 && !snapshot.state.is_running() {
        return "Ready".to_string();
    }

    let (minutes, seconds) = snapshot.minutes_and_seconds();
    let description = accessibility_time_description(minutes, seconds);
    match snapshot.state {
        TimerState::Paused => format!("Paused at {}", description),
        TimerState::Running => format!("{} remaining", description),
        _ => description,
    }
}

/// `HH:MM` in local time
pub fn time_label(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M").to_string()
}

/// One-line rendering of a timer for the terminal host
pub fn status_line(index: usize, snapshot: &ClockSnapshot) -> String {
    let state = match snapshot.state {
        TimerState::Idle => "idle",
        TimerState::Armed => "armed",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
    };
    let seconds = seconds_display(snapshot.seconds);
    let clock = minutes_display(snapshot.seconds);
    let separator = if seconds.is_empty() { "" } else { " " };
    format!(
        "[{}] {}{}{}  {}  ({})",
        index, clock, separator, seconds, snapshot.time_label, state
    )
}
