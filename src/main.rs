//! Desk Timer - a keyboard-driven countdown timer
//!
//! This is the main entry point for the desk-timer application.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use desk_timer::{
    clock::SystemClock,
    config::Config,
    services::check_notify_send_available,
    state::{AppState, HostEvent},
    tasks::{spawn_terminal_input, Host, HostOptions},
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so the status lines on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(format!("desk_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting desk-timer v1.0.0");

    let startup_request = config.remote_request().map_err(anyhow::Error::msg)?;

    let mut notify = !config.no_notify;
    if notify {
        if let Err(e) = check_notify_send_available().await {
            warn!("{}", e);
            notify = false;
        }
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut state = AppState::new(Arc::new(SystemClock::new()), events_tx.clone());
    state.open_window();
    if config.badge {
        state.set_badge_owner(Some(1));
    }

    if let Some(request) = startup_request {
        info!("Startup command '{}' for window {}", request.command, request.window_index());
        events_tx.send(HostEvent::Remote(request))?;
    }

    spawn_terminal_input(events_tx)?;

    info!("Type digits then Enter to start; '.' switches to seconds, Esc clears");
    info!("  /CMD [N]  remote command (new, stop, reset, pause, M:S, minutes)");
    info!("  @N focus, #N badge, !N close, ~P dial (0-1), ? status");

    let options = HostOptions {
        notify,
        sound: config.alert_sound(),
    };
    Host::new(state, options).run(events_rx, shutdown_signal()).await;

    info!("desk-timer shutdown complete");
    Ok(())
}
