//! End-to-end runs of the host loop against a hand-driven clock

use std::sync::Arc;
use std::time::Duration;

use desk_timer::{
    clock::ManualClock,
    services::AlertSound,
    state::{AppState, HostEvent, TimerState},
    tasks::{Host, HostOptions},
    RemoteRequest,
};
use tokio::sync::mpsc;

fn quiet() -> HostOptions {
    HostOptions {
        notify: false,
        sound: AlertSound::Silent,
    }
}

#[tokio::test]
async fn test_loop_exits_after_last_countdown_completes() {
    let clock = ManualClock::at_epoch();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut state = AppState::new(Arc::new(clock.clone()), tx.clone());
    state.open_window();
    assert!(state.dispatch(&RemoteRequest::new("0:02", None)));

    // Ticks and the completion are queued before the loop starts
    clock.advance(Duration::from_secs(2));
    tx.send(HostEvent::InputClosed).unwrap();

    let state = Host::new(state, quiet())
        .run(rx, std::future::pending())
        .await;

    let window = state.window(1).unwrap();
    assert_eq!(window.countdown().state(), TimerState::Idle);
    assert_eq!(window.countdown().seconds(), 0.0);
    assert_eq!(window.countdown().last_duration(), Some(2.0));
}

#[tokio::test]
async fn test_loop_applies_remote_commands_in_order() {
    let clock = ManualClock::at_epoch();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut state = AppState::new(Arc::new(clock.clone()), tx.clone());
    state.open_window();

    let commands = [
        ("new", None),
        ("5", Some(2)),
        ("pause", Some(2)),
        ("bogus", Some(1)),
    ];
    for (command, window) in commands {
        tx.send(HostEvent::Remote(RemoteRequest::new(command, window)))
            .unwrap();
    }
    tx.send(HostEvent::Badge(Some(2))).unwrap();
    tx.send(HostEvent::InputClosed).unwrap();

    // A paused countdown keeps the loop alive after input closes
    let shutdown = tokio::time::sleep(Duration::from_millis(100));
    let state = Host::new(state, quiet()).run(rx, shutdown).await;

    assert_eq!(state.window_count(), 2);
    assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Idle);
    let second = state.window(2).unwrap();
    assert_eq!(second.countdown().state(), TimerState::Paused);
    assert_eq!(second.countdown().seconds(), 300.0);
    assert_eq!(state.badge_text(), Some("05:00".to_string()));
}

#[tokio::test]
async fn test_shutdown_future_stops_loop() {
    let clock = ManualClock::at_epoch();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut state = AppState::new(Arc::new(clock.clone()), tx.clone());
    state.open_window();
    state.dispatch(&RemoteRequest::new("10", None));

    let state = Host::new(state, quiet()).run(rx, async {}).await;

    assert_eq!(state.window(1).unwrap().countdown().state(), TimerState::Running);
}
