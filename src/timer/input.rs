//! Keystroke duration entry
//!
//! Digits shift into either the minutes or the seconds field of a single
//! seconds value, calculator style. The two fields are edited independently
//! through multiply/divide by 60, never through a concatenated string.

use serde::{Deserialize, Serialize};

/// Keystroke entry stays strictly below 999 minutes
pub const MAX_INPUT_SECONDS: u32 = 999 * 60;

/// Which field the next digit lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    MinutesEntry,
    SecondsEntry,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::MinutesEntry => InputMode::SecondsEntry,
            InputMode::SecondsEntry => InputMode::MinutesEntry,
        }
    }
}

/// Result of feeding one digit to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitInput {
    pub seconds: u32,
    pub accepted: bool,
}

/// Digit/backspace/mode-toggle processor
#[derive(Debug, Clone, Default)]
pub struct DurationInputEngine {
    seconds: u32,
    mode: InputMode,
}

impl DurationInputEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Re-seed the engine with the value currently on display
    pub fn set_seconds(&mut self, seconds: u32) {
        self.seconds = seconds;
    }

    /// Shift a digit into the active field.
    ///
    /// Values that would reach [`MAX_INPUT_SECONDS`] are rejected and leave
    /// the engine untouched. A full seconds field (two digits once minutes
    /// are present) swallows the digit but still counts as accepted.
    pub fn digit(&mut self, digit: u8) -> DigitInput {
        let digit = u32::from(digit.min(9));
        let (minutes, seconds) = self.split();

        let candidate = match self.mode {
            InputMode::MinutesEntry => minutes
                .saturating_mul(600)
                .saturating_add(seconds + digit * 60),
            InputMode::SecondsEntry => {
                if seconds < 6 || minutes == 0 {
                    minutes.saturating_mul(60).saturating_add(seconds * 10 + digit)
                } else {
                    self.seconds
                }
            }
        };

        if candidate < MAX_INPUT_SECONDS {
            self.seconds = candidate;
            DigitInput { seconds: candidate, accepted: true }
        } else {
            DigitInput { seconds: self.seconds, accepted: false }
        }
    }

    /// Drop the last digit of the active field
    pub fn backspace(&mut self) -> u32 {
        let (minutes, seconds) = self.split();
        self.seconds = match self.mode {
            InputMode::SecondsEntry => minutes * 60 + seconds / 10,
            InputMode::MinutesEntry => (minutes / 10) * 60 + seconds,
        };
        self.seconds
    }

    pub fn toggle_mode(&mut self) -> InputMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn reset(&mut self) {
        self.seconds = 0;
        self.mode = InputMode::MinutesEntry;
    }

    fn split(&self) -> (u32, u32) {
        (self.seconds / 60, self.seconds % 60)
    }
}
