//! Nonlinear dial scale
//!
//! The drag control spends half a turn's worth of extra resolution on the
//! first few minutes of a one-hour dial. Durations whose total exceeds an hour
//! get a linear dial.

/// Minutes of the linear range that are remapped
pub const LOW_CUTOFF_MINUTES: f64 = 6.0;
/// Minutes of dial those low minutes are squeezed into
pub const COMPRESSED_MINUTES: f64 = 3.0;

const SCALE_RATIO: f64 = LOW_CUTOFF_MINUTES / COMPRESSED_MINUTES;

/// Convert a linear fraction to the dial's angular fraction
pub fn to_angle_fraction(progress: f64, total_minutes: f64) -> f64 {
    if total_minutes > 60.0 {
        return progress;
    }

    if progress <= LOW_CUTOFF_MINUTES / 60.0 {
        progress / SCALE_RATIO
    } else {
        (progress * 60.0 - LOW_CUTOFF_MINUTES + COMPRESSED_MINUTES) / (60.0 - COMPRESSED_MINUTES)
    }
}

/// Exact inverse of [`to_angle_fraction`]
pub fn to_duration_fraction(progress: f64, total_minutes: f64) -> f64 {
    if total_minutes > 60.0 {
        return progress;
    }

    if progress <= COMPRESSED_MINUTES / 60.0 {
        progress * SCALE_RATIO
    } else {
        (progress * (60.0 - COMPRESSED_MINUTES) - COMPRESSED_MINUTES + LOW_CUTOFF_MINUTES) / 60.0
    }
}

/// Seconds selected by dragging the control to `position`.
///
/// Short durations snap to 10 second steps, anything above five minutes
/// snaps to whole minutes.
pub fn seconds_for_dial(position: f64, current_minutes: f64) -> f64 {
    let seconds = (to_angle_fraction(position, current_minutes) * 3600.0).round();
    if seconds <= 300.0 {
        seconds - seconds % 10.0
    } else {
        seconds - seconds % 60.0
    }
}

/// Where the control sits for a displayed duration
pub fn dial_position(seconds: f64) -> f64 {
    let minutes = (seconds / 60.0).floor();
    to_duration_fraction(seconds / 60.0 / 60.0, minutes)
}
