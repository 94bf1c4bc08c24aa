//! Host loop
//!
//! A single task owns the window registry and applies every event in order,
//! so countdowns, ticks and input never race each other.

use std::{
    collections::{hash_map::Entry, HashMap},
    future::Future,
};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::{
    services::{deliver_notification, AlertSound, COMPLETION_TITLE},
    state::{AppState, ClockSnapshot, HostEvent, WindowId},
    timer::{format, TickOutcome},
};

/// How completions are announced
#[derive(Debug, Clone, Copy)]
pub struct HostOptions {
    pub notify: bool,
    pub sound: AlertSound,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            notify: true,
            sound: AlertSound::Default,
        }
    }
}

/// What the loop should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// A window completed; announce it
    Announce { index: usize },
    /// Print a status dump
    Print(String),
}

/// A window's snapshot feed and the line last printed for it
#[derive(Debug)]
struct View {
    snapshots: watch::Receiver<ClockSnapshot>,
    line: String,
}

/// Follows each window's published snapshots and prints only changed lines
#[derive(Debug, Default)]
pub struct Screen {
    views: HashMap<WindowId, View>,
    badge: Option<String>,
}

impl Screen {
    /// Lines that changed since the previous render
    pub fn render(&mut self, state: &AppState) -> Vec<String> {
        let mut changed = Vec::new();

        for (position, window) in state.windows().iter().enumerate() {
            let index = position + 1;
            match self.views.entry(window.id()) {
                Entry::Occupied(mut entry) => {
                    let view = entry.get_mut();
                    // Positions shift when windows close, so the line is rebuilt
                    // even when no new snapshot arrived
                    let line = format::status_line(index, &view.snapshots.borrow_and_update());
                    if line != view.line {
                        view.line = line.clone();
                        changed.push(line);
                    }
                }
                Entry::Vacant(entry) => {
                    let snapshots = window.countdown().subscribe();
                    let line = format::status_line(index, &snapshots.borrow());
                    entry.insert(View { snapshots, line: line.clone() });
                    changed.push(line);
                }
            }
        }
        self.views.retain(|id, _| state.window_by_id(*id).is_some());

        let badge = state.badge_text();
        if badge != self.badge {
            changed.push(format!("badge: {}", badge.as_deref().unwrap_or("-")));
            self.badge = badge;
        }

        changed
    }
}

/// The event loop's state
#[derive(Debug)]
pub struct Host {
    state: AppState,
    options: HostOptions,
    screen: Screen,
    input_closed: bool,
}

impl Host {
    pub fn new(state: AppState, options: HostOptions) -> Self {
        Self {
            state,
            options,
            screen: Screen::default(),
            input_closed: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Apply one event to the registry
    pub fn handle_event(&mut self, event: HostEvent) -> Step {
        match event {
            HostEvent::Tick { window, tick } => {
                if self.state.handle_tick(window, tick) == TickOutcome::Ignored {
                    debug!("Ignored stale tick for window {}: {:?}", window, tick);
                }
                Step::Continue
            }
            HostEvent::Completed { window } => match self.state.index_of(window) {
                Some(index) => {
                    info!("Timer {} completed", index);
                    Step::Announce { index }
                }
                None => Step::Continue,
            },
            HostEvent::Key(key) => {
                self.state.handle_key(key);
                Step::Continue
            }
            HostEvent::Remote(request) => {
                self.state.dispatch(&request);
                Step::Continue
            }
            HostEvent::Focus(index) => {
                if !self.state.focus(index) {
                    debug!("No window {} to focus", index);
                }
                Step::Continue
            }
            HostEvent::Badge(index) => {
                if !self.state.set_badge_owner(index) {
                    debug!("No window {:?} for the badge", index);
                }
                Step::Continue
            }
            HostEvent::Dial(position) => {
                if !self.state.drag_focused(position) {
                    debug!("Dial drag to {} started nothing", position);
                }
                Step::Continue
            }
            HostEvent::Close(index) => {
                self.state.close_window(index);
                Step::Continue
            }
            HostEvent::Status => match serde_json::to_string_pretty(&self.state.statuses()) {
                Ok(json) => Step::Print(json),
                Err(e) => {
                    error!("Failed to serialize status: {}", e);
                    Step::Continue
                }
            },
            HostEvent::InputClosed => {
                self.input_closed = true;
                Step::Continue
            }
        }
    }

    /// Input is gone and nothing is left to count down
    pub fn should_exit(&self) -> bool {
        self.input_closed
            && !self
                .state
                .windows()
                .iter()
                .any(|w| w.countdown().state().is_active())
    }

    /// Changed status lines since the last call
    pub fn render(&mut self) -> Vec<String> {
        self.screen.render(&self.state)
    }

    /// Run until `shutdown` resolves or input closes with no countdown left
    pub async fn run<S>(
        mut self,
        mut events_rx: mpsc::UnboundedReceiver<HostEvent>,
        shutdown: S,
    ) -> AppState
    where
        S: Future<Output = ()>,
    {
        info!("Starting timer host loop");
        tokio::pin!(shutdown);

        print_lines(self.render());

        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    let Some(event) = event else {
                        warn!("Event channel closed");
                        break;
                    };

                    match self.handle_event(event) {
                        Step::Continue => {}
                        Step::Announce { index } => self.announce(index),
                        Step::Print(text) => println!("{}", text),
                    }
                    print_lines(self.render());

                    if self.should_exit() {
                        info!("Input closed and no countdown in progress");
                        break;
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Timer host loop stopped");
        self.state
    }

    fn announce(&self, index: usize) {
        // Terminal bell
        print!("\x07");
        println!("Timer {} is done", index);

        if !self.options.notify {
            return;
        }

        let sound = self.options.sound;
        tokio::spawn(async move {
            let body = format!("Timer {}", index);
            if let Err(e) = deliver_notification(COMPLETION_TITLE, &body, sound).await {
                warn!("Failed to deliver notification: {}", e);
            }
        });
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::state::TimerState;
    use crate::timer::{Key, RemoteRequest};
    use std::sync::Arc;

    fn host() -> (ManualClock, Host, mpsc::UnboundedReceiver<HostEvent>) {
        let clock = ManualClock::at_epoch();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(Arc::new(clock.clone()), tx);
        state.open_window();
        let options = HostOptions { notify: false, sound: AlertSound::Silent };
        (clock, Host::new(state, options), rx)
    }

    fn drain(host: &mut Host, rx: &mut mpsc::UnboundedReceiver<HostEvent>) -> Vec<Step> {
        let mut steps = Vec::new();
        while let Ok(event) = rx.try_recv() {
            steps.push(host.handle_event(event));
        }
        steps
    }

    #[test]
    fn test_keys_then_completion_announces_once() {
        let (clock, mut host, mut rx) = host();
        host.handle_event(HostEvent::Key(Key::Digit(1)));
        host.handle_event(HostEvent::Key(Key::Confirm));

        clock.advance(std::time::Duration::from_secs(60));
        let steps = drain(&mut host, &mut rx);
        let announced: Vec<_> = steps
            .iter()
            .filter(|s| matches!(s, Step::Announce { .. }))
            .collect();
        assert_eq!(announced, vec![&Step::Announce { index: 1 }]);
    }

    #[test]
    fn test_exit_waits_for_running_countdown() {
        let (clock, mut host, mut rx) = host();
        host.handle_event(HostEvent::Remote(RemoteRequest::new("0:03", None)));
        host.handle_event(HostEvent::InputClosed);
        assert!(!host.should_exit());

        clock.advance(std::time::Duration::from_secs(3));
        drain(&mut host, &mut rx);
        assert!(host.should_exit());
    }

    #[test]
    fn test_status_dump_is_json() {
        let (_, mut host, _rx) = host();
        match host.handle_event(HostEvent::Status) {
            Step::Print(json) => {
                let value: serde_json::Value = serde_json::from_str(&json).unwrap();
                assert_eq!(value[0]["index"], 1);
                assert_eq!(value[0]["snapshot"]["state"], "idle");
                assert_eq!(value[0]["description"], "Ready");
            }
            other => panic!("expected a status dump, got {:?}", other),
        }
    }

    #[test]
    fn test_render_only_reports_changes() {
        let (_, mut host, _rx) = host();
        assert_eq!(host.render().len(), 1);
        assert!(host.render().is_empty());

        host.handle_event(HostEvent::Key(Key::Digit(2)));
        let lines = host.render();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[1] 2'"));

        host.handle_event(HostEvent::Badge(Some(1)));
        host.handle_event(HostEvent::Key(Key::Confirm));
        let lines = host.render();
        assert!(lines.contains(&"badge: 02:00".to_string()));
    }

    #[test]
    fn test_render_follows_published_ticks() {
        let (clock, mut host, mut rx) = host();
        host.handle_event(HostEvent::Remote(RemoteRequest::new("2", None)));
        host.render();

        clock.advance(std::time::Duration::from_secs(1));
        drain(&mut host, &mut rx);
        let lines = host.render();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[1] 1' 59\""), "{}", lines[0]);
    }

    #[test]
    fn test_render_renumbers_after_close() {
        let (_, mut host, _rx) = host();
        host.handle_event(HostEvent::Remote(RemoteRequest::new("new", None)));
        host.handle_event(HostEvent::Key(Key::Digit(3)));
        assert_eq!(host.render().len(), 2);

        host.handle_event(HostEvent::Close(1));
        let lines = host.render();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[1] 3'"), "{}", lines[0]);
    }

    #[test]
    fn test_new_window_and_close() {
        let (_, mut host, _rx) = host();
        host.handle_event(HostEvent::Remote(RemoteRequest::new("new", None)));
        assert_eq!(host.state().window_count(), 2);
        host.handle_event(HostEvent::Close(1));
        assert_eq!(host.state().window_count(), 1);
        assert_eq!(
            host.state().window(1).unwrap().countdown().state(),
            TimerState::Idle
        );
    }
}
