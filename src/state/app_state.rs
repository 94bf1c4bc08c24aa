//! Registry of open timer windows

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, Tick},
    timer::{Command, CountdownClock, Key, RemoteRequest, TickOutcome, TickSink},
};

use super::{HostEvent, TimerWindow, WindowId, WindowStatus};

/// All open windows in creation order, plus the single window allowed to
/// show the dock badge. Owned by the host loop; nothing here is shared.
pub struct AppState {
    clock: Arc<dyn Clock>,
    events_tx: mpsc::UnboundedSender<HostEvent>,
    windows: Vec<TimerWindow>,
    focused: Option<WindowId>,
    badge_owner: Option<WindowId>,
    next_id: WindowId,
}

impl AppState {
    /// Create an empty registry whose schedules post into `events_tx`
    pub fn new(clock: Arc<dyn Clock>, events_tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            clock,
            events_tx,
            windows: Vec::new(),
            focused: None,
            badge_owner: None,
            next_id: 1,
        }
    }

    /// Open a window, give it focus and return its id
    pub fn open_window(&mut self) -> WindowId {
        let id = self.next_id;
        self.next_id += 1;

        let tick_tx = self.events_tx.clone();
        let sink: TickSink = Arc::new(move |tick: Tick| {
            // The receiver only goes away during shutdown
            let _ = tick_tx.send(HostEvent::Tick { window: id, tick });
        });

        let mut countdown = CountdownClock::new(Arc::clone(&self.clock), sink);
        let completed_tx = self.events_tx.clone();
        countdown.on_complete(move || {
            if let Err(e) = completed_tx.send(HostEvent::Completed { window: id }) {
                warn!("Failed to send completion for window {}: {}", id, e);
            }
        });
        countdown.set_visible(true);

        self.windows.push(TimerWindow::new(id, countdown));
        self.focused = Some(id);
        info!("Opened timer window {} ({} open)", id, self.windows.len());
        id
    }

    /// Close a window by 1-based index. Its schedules are cancelled with it.
    pub fn close_window(&mut self, index: i64) -> bool {
        let Some(position) = self.position(index) else {
            debug!("No window {} to close", index);
            return false;
        };

        let window = self.windows.remove(position);
        if self.badge_owner == Some(window.id()) {
            self.badge_owner = None;
        }
        if self.focused == Some(window.id()) {
            self.focused = self.windows.last().map(TimerWindow::id);
        }
        info!("Closed timer window {} ({} open)", window.id(), self.windows.len());
        true
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn windows(&self) -> &[TimerWindow] {
        &self.windows
    }

    /// Window by 1-based index
    pub fn window(&self, index: i64) -> Option<&TimerWindow> {
        self.position(index).map(|p| &self.windows[p])
    }

    /// Window by 1-based index
    pub fn window_mut(&mut self, index: i64) -> Option<&mut TimerWindow> {
        self.position(index).map(|p| &mut self.windows[p])
    }

    pub fn window_by_id(&self, id: WindowId) -> Option<&TimerWindow> {
        self.windows.iter().find(|w| w.id() == id)
    }

    /// 1-based index of a window id
    pub fn index_of(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id() == id).map(|p| p + 1)
    }

    pub fn focused(&self) -> Option<&TimerWindow> {
        self.focused.and_then(|id| self.window_by_id(id))
    }

    pub fn focus(&mut self, index: i64) -> bool {
        match self.window(index).map(TimerWindow::id) {
            Some(id) => {
                self.focused = Some(id);
                true
            }
            None => false,
        }
    }

    /// Route a remote request. Invalid commands and unknown windows are
    /// dropped without surfacing anything.
    pub fn dispatch(&mut self, request: &RemoteRequest) -> bool {
        let command = request.command();
        match command {
            Command::NewWindow => {
                self.open_window();
                true
            }
            Command::Invalid => {
                debug!("Dropping invalid command '{}'", request.command);
                false
            }
            _ => {
                let index = request.window_index();
                match self.window_mut(index) {
                    Some(window) => window.apply(command),
                    None => {
                        debug!("Dropping {:?} for missing window {}", command, index);
                        false
                    }
                }
            }
        }
    }

    /// Send a keystroke to the focused window
    pub fn handle_key(&mut self, key: Key) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        match self.windows.iter_mut().find(|w| w.id() == id) {
            Some(window) => window.handle_key(key),
            None => false,
        }
    }

    /// Drag the focused window's dial and release it, starting the countdown
    pub fn drag_focused(&mut self, position: f64) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        match self.windows.iter_mut().find(|w| w.id() == id) {
            Some(window) => {
                window.drag_to(position);
                window.release_drag()
            }
            None => false,
        }
    }

    /// Deliver a schedule firing to its window
    pub fn handle_tick(&mut self, window: WindowId, tick: Tick) -> TickOutcome {
        match self.windows.iter_mut().find(|w| w.id() == window) {
            Some(window) => window.countdown_mut().tick(tick),
            None => TickOutcome::Ignored,
        }
    }

    /// Move the dock badge to a window, or hide it with `None`
    pub fn set_badge_owner(&mut self, index: Option<i64>) -> bool {
        let owner = match index {
            Some(index) => match self.window(index) {
                Some(window) => Some(window.id()),
                None => return false,
            },
            None => None,
        };

        for window in &mut self.windows {
            window.set_in_dock(Some(window.id()) == owner);
        }
        self.badge_owner = owner;
        debug!("Dock badge owner is now {:?}", owner);
        true
    }

    pub fn badge_owner(&self) -> Option<WindowId> {
        self.badge_owner
    }

    /// Badge text of the owning window, when it has a countdown in progress
    pub fn badge_text(&self) -> Option<String> {
        self.badge_owner
            .and_then(|id| self.window_by_id(id))
            .and_then(TimerWindow::badge_text)
    }

    pub fn statuses(&self) -> Vec<WindowStatus> {
        self.windows
            .iter()
            .enumerate()
            .map(|(i, w)| w.status(i + 1))
            .collect()
    }

    fn position(&self, index: i64) -> Option<usize> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        (position < self.windows.len()).then_some(position)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("windows", &self.windows)
            .field("focused", &self.focused)
            .field("badge_owner", &self.badge_owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::state::TimerState;

    fn registry() -> (ManualClock, AppState, mpsc::UnboundedReceiver<HostEvent>) {
        let clock = ManualClock::at_epoch();
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState::new(Arc::new(clock.clone()), tx);
        (clock, state, rx)
    }

    #[test]
    fn test_windows_are_one_based() {
        let (_, mut state, _rx) = registry();
        let first = state.open_window();
        let second = state.open_window();

        assert_eq!(state.window(1).map(TimerWindow::id), Some(first));
        assert_eq!(state.window(2).map(TimerWindow::id), Some(second));
        assert!(state.window(0).is_none());
        assert!(state.window(-1).is_none());
        assert!(state.window(3).is_none());
        assert_eq!(state.index_of(second), Some(2));
    }

    #[test]
    fn test_dispatch_routes_by_window() {
        let (_, mut state, _rx) = registry();
        state.open_window();
        state.open_window();

        assert!(state.dispatch(&RemoteRequest::new("2:30", Some(2))));
        assert_eq!(state.window(2).unwrap().countdown().state(), TimerState::Running);
        assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Idle);

        assert!(state.dispatch(&RemoteRequest::new("5", None)));
        assert_eq!(state.window(1).unwrap().countdown().seconds(), 300.0);
    }

    #[test]
    fn test_dispatch_drops_invalid_and_out_of_range() {
        let (_, mut state, _rx) = registry();
        state.open_window();

        assert!(!state.dispatch(&RemoteRequest::new("bogus", None)));
        assert!(!state.dispatch(&RemoteRequest::new("5", Some(4))));
        assert!(!state.dispatch(&RemoteRequest::new("5", Some(0))));
        assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Idle);
    }

    #[test]
    fn test_new_ignores_window_index() {
        let (_, mut state, _rx) = registry();
        assert!(state.dispatch(&RemoteRequest::new("NEW", Some(99))));
        assert_eq!(state.window_count(), 1);
    }

    #[test]
    fn test_keys_go_to_focused_window() {
        let (_, mut state, _rx) = registry();
        assert!(!state.handle_key(Key::Digit(1)));

        state.open_window();
        state.open_window();
        state.handle_key(Key::Digit(4));
        assert_eq!(state.window(2).unwrap().countdown().seconds(), 240.0);

        assert!(state.focus(1));
        state.handle_key(Key::Digit(1));
        assert_eq!(state.window(1).unwrap().countdown().seconds(), 60.0);
        assert!(!state.focus(7));
    }

    #[test]
    fn test_dial_drag_starts_focused_window() {
        let (_, mut state, _rx) = registry();
        assert!(!state.drag_focused(0.1));

        state.open_window();
        state.open_window();
        assert!(state.drag_focused(0.1));
        let second = state.window(2).unwrap().countdown();
        assert_eq!(second.state(), TimerState::Running);
        assert_eq!(second.seconds(), 180.0);
        assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Idle);

        // Zero seconds arms nothing, so release does not start
        assert!(!state.drag_focused(0.0));
        assert_eq!(state.window(2).unwrap().countdown().state(), TimerState::Idle);
    }

    #[test]
    fn test_badge_moves_between_windows() {
        let (_, mut state, _rx) = registry();
        state.open_window();
        state.open_window();

        assert!(state.set_badge_owner(Some(1)));
        assert!(state.window(1).unwrap().in_dock());
        assert!(state.set_badge_owner(Some(2)));
        assert!(!state.window(1).unwrap().in_dock());
        assert!(state.window(2).unwrap().in_dock());
        assert!(!state.set_badge_owner(Some(5)));
        assert_eq!(state.badge_owner(), state.window(2).map(TimerWindow::id));

        assert_eq!(state.badge_text(), None);
        state.dispatch(&RemoteRequest::new("1:05", Some(2)));
        assert_eq!(state.badge_text(), Some("01:05".to_string()));

        assert!(state.close_window(2));
        assert_eq!(state.badge_owner(), None);
    }

    #[test]
    fn test_ticks_and_completion_flow_through_channel() {
        let (clock, mut state, mut rx) = registry();
        let id = state.open_window();
        state.dispatch(&RemoteRequest::new("0:02", None));

        clock.advance(std::time::Duration::from_secs(2));
        let mut completed = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                HostEvent::Tick { window, tick } => {
                    state.handle_tick(window, tick);
                }
                HostEvent::Completed { window } => {
                    assert_eq!(window, id);
                    completed += 1;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Idle);
    }

    #[test]
    fn test_closing_a_window_cancels_its_schedules() {
        let (clock, mut state, _rx) = registry();
        state.open_window();
        state.dispatch(&RemoteRequest::new("1", None));
        assert!(clock.active_schedules() > 0);

        assert!(state.close_window(1));
        assert_eq!(clock.active_schedules(), 0);
        assert_eq!(state.handle_tick(1, Tick {
            kind: crate::clock::TickKind::Countdown,
            generation: 1,
        }), TickOutcome::Ignored);
    }
}
