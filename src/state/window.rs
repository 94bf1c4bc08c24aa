//! One timer window: keystroke entry wired to its countdown

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::ClockSnapshot;
use crate::timer::{dial, format, Command, CountdownClock, DurationInputEngine, InputMode, Key};

/// Stable identity of a window, independent of its position in the registry
pub type WindowId = u64;

/// Serializable view of a window for status dumps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStatus {
    pub index: usize,
    pub id: WindowId,
    pub snapshot: ClockSnapshot,
    pub input_mode: InputMode,
    pub in_dock: bool,
    pub dial_position: f64,
    pub description: String,
}

#[derive(Debug)]
pub struct TimerWindow {
    id: WindowId,
    countdown: CountdownClock,
    input: DurationInputEngine,
    in_dock: bool,
}

impl TimerWindow {
    pub fn new(id: WindowId, countdown: CountdownClock) -> Self {
        Self {
            id,
            countdown,
            input: DurationInputEngine::new(),
            in_dock: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn countdown(&self) -> &CountdownClock {
        &self.countdown
    }

    pub fn countdown_mut(&mut self) -> &mut CountdownClock {
        &mut self.countdown
    }

    pub fn input_mode(&self) -> InputMode {
        self.input.mode()
    }

    pub fn in_dock(&self) -> bool {
        self.in_dock
    }

    pub(crate) fn set_in_dock(&mut self, in_dock: bool) {
        self.in_dock = in_dock;
    }

    /// Apply one keystroke. Returns whether anything changed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        debug!("Window {} key {:?}", self.id, key);
        match key {
            Key::Digit(digit) => {
                self.sync_input();
                let result = self.input.digit(digit);
                if result.accepted {
                    self.countdown.set_duration(f64::from(result.seconds));
                }
                result.accepted
            }
            Key::ToggleMode => {
                self.input.toggle_mode();
                true
            }
            Key::Backspace => {
                self.sync_input();
                let seconds = self.input.backspace();
                self.countdown.set_duration(f64::from(seconds));
                true
            }
            Key::Escape => {
                self.input.reset();
                self.countdown.reset();
                true
            }
            Key::Confirm => self.countdown.confirm(),
            Key::RepeatLast => self.countdown.restart_last(),
        }
    }

    /// Apply a window-level command. Window creation and invalid commands
    /// belong to the registry and are ignored here.
    pub fn apply(&mut self, command: Command) -> bool {
        debug!("Window {} command {:?}", self.id, command);
        match command {
            Command::Stop => self.countdown.stop(),
            Command::Reset => {
                self.input.reset();
                self.countdown.reset();
                true
            }
            Command::TogglePause => self.countdown.toggle_pause(),
            Command::StartTimer(seconds) => {
                self.countdown.set_duration(seconds);
                self.countdown.start()
            }
            Command::NewWindow | Command::Invalid => false,
        }
    }

    /// Dragging the dial sets the duration and abandons any countdown
    pub fn drag_to(&mut self, position: f64) -> f64 {
        let position = if position.is_finite() { position.clamp(0.0, 1.0) } else { 0.0 };
        let minutes = (self.countdown.seconds() / 60.0).floor();
        let seconds = dial::seconds_for_dial(position, minutes);
        self.countdown.set_duration(seconds);
        seconds
    }

    /// Releasing the dial starts the countdown
    pub fn release_drag(&mut self) -> bool {
        self.countdown.start()
    }

    pub fn dial_position(&self) -> f64 {
        dial::dial_position(self.countdown.seconds())
    }

    /// `MM:SS` while a countdown is running or paused
    pub fn badge_text(&self) -> Option<String> {
        if !self.countdown.state().is_active() {
            return None;
        }
        let (minutes, seconds) = self.countdown.snapshot().minutes_and_seconds();
        Some(format::badge_string(minutes, seconds))
    }

    pub fn status(&self, index: usize) -> WindowStatus {
        let snapshot = self.countdown.snapshot();
        WindowStatus {
            index,
            id: self.id,
            description: format::accessibility_value(&snapshot),
            snapshot,
            input_mode: self.input.mode(),
            in_dock: self.in_dock,
            dial_position: self.dial_position(),
        }
    }

    /// Typing edits whatever is on display, including a running countdown
    fn sync_input(&mut self) {
        self.input.set_seconds(self.countdown.seconds().max(0.0) as u32);
    }
}
