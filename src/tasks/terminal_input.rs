//! Terminal input task
//!
//! Each stdin line is either a run of keystrokes for the focused window or a
//! host command:
//!
//! - `/CMD [N]` remote command for window N, e.g. `/2:30 2`
//! - `timer://...` URL trigger
//! - `@N` focus window N, `!N` close window N
//! - `#N` show the badge for window N, `#` hide it
//! - `~P` drag the focused dial to P (0 to 1) and release it
//! - `?` status dump

use std::{
    io::{self, BufRead},
    thread,
};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    state::HostEvent,
    timer::{command::URL_SCHEME, Key, RemoteRequest},
};

/// Translate one terminal line into host events
pub fn parse_line(line: &str) -> Vec<HostEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();

    if let Some(rest) = trimmed.strip_prefix('/') {
        let mut parts = rest.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };
        let window = parts.next().and_then(|w| w.parse::<i64>().ok());
        return vec![HostEvent::Remote(RemoteRequest::new(command, window))];
    }

    let url_prefix = format!("{}:", URL_SCHEME);
    if trimmed
        .get(..url_prefix.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&url_prefix))
    {
        return match RemoteRequest::from_url(trimmed) {
            Ok(request) => vec![HostEvent::Remote(request)],
            Err(e) => {
                debug!("Dropping URL trigger: {}", e);
                Vec::new()
            }
        };
    }

    if trimmed == "?" {
        return vec![HostEvent::Status];
    }
    if trimmed == "#" {
        return vec![HostEvent::Badge(None)];
    }

    let indexed = |prefix: char| {
        trimmed
            .strip_prefix(prefix)
            .and_then(|n| n.trim().parse::<i64>().ok())
    };
    if let Some(index) = indexed('@') {
        return vec![HostEvent::Focus(index)];
    }
    if let Some(index) = indexed('#') {
        return vec![HostEvent::Badge(Some(index))];
    }
    if let Some(index) = indexed('!') {
        return vec![HostEvent::Close(index)];
    }
    if let Some(position) = trimmed.strip_prefix('~') {
        return match position.trim().parse::<f64>() {
            Ok(position) if (0.0..=1.0).contains(&position) => vec![HostEvent::Dial(position)],
            _ => {
                debug!("Dropping dial position '{}'", position);
                Vec::new()
            }
        };
    }

    Key::parse_line(line).into_iter().map(HostEvent::Key).collect()
}

/// Read lines from `reader` until it closes, posting events to the host loop
pub fn read_terminal_input<R: BufRead>(reader: R, events_tx: &mpsc::UnboundedSender<HostEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read terminal input: {}", e);
                break;
            }
        };
        for event in parse_line(&line) {
            if events_tx.send(event).is_err() {
                debug!("Host loop gone, stopping terminal input");
                return;
            }
        }
    }

    info!("Terminal input closed");
    let _ = events_tx.send(HostEvent::InputClosed);
}

/// Read stdin on a detached thread.
///
/// A blocking read cannot be cancelled, so it stays off the runtime and never
/// holds up shutdown.
pub fn spawn_terminal_input(events_tx: mpsc::UnboundedSender<HostEvent>) -> io::Result<()> {
    info!("Starting terminal input thread");
    thread::Builder::new()
        .name("terminal-input".to_string())
        .spawn(move || read_terminal_input(io::stdin().lock(), &events_tx))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystrokes() {
        assert_eq!(
            parse_line("1.3"),
            vec![
                HostEvent::Key(Key::Digit(1)),
                HostEvent::Key(Key::ToggleMode),
                HostEvent::Key(Key::Digit(3)),
            ]
        );
        assert_eq!(parse_line(""), vec![HostEvent::Key(Key::Confirm)]);
        assert_eq!(parse_line("\u{1B}"), vec![HostEvent::Key(Key::Escape)]);
    }

    #[test]
    fn test_remote_commands() {
        assert_eq!(
            parse_line("/2:30 2"),
            vec![HostEvent::Remote(RemoteRequest::new("2:30", Some(2)))]
        );
        assert_eq!(
            parse_line("/stop"),
            vec![HostEvent::Remote(RemoteRequest::new("stop", None))]
        );
        assert_eq!(
            parse_line("timer://pause?window=2"),
            vec![HostEvent::Remote(RemoteRequest::new("pause", Some(2)))]
        );
        assert!(parse_line("timer://").is_empty());
        assert!(parse_line("/").is_empty());
    }

    #[test]
    fn test_host_commands() {
        assert_eq!(parse_line("?"), vec![HostEvent::Status]);
        assert_eq!(parse_line("@2"), vec![HostEvent::Focus(2)]);
        assert_eq!(parse_line("#1"), vec![HostEvent::Badge(Some(1))]);
        assert_eq!(parse_line("#"), vec![HostEvent::Badge(None)]);
        assert_eq!(parse_line("!3"), vec![HostEvent::Close(3)]);
        assert_eq!(parse_line("~0.25"), vec![HostEvent::Dial(0.25)]);
        assert!(parse_line("~1.5").is_empty());
        assert!(parse_line("~NaN").is_empty());
        assert!(parse_line("~").is_empty());
    }

    #[test]
    fn test_reader_posts_events_then_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        read_terminal_input("5\n/stop 2\n".as_bytes(), &tx);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events,
            vec![
                HostEvent::Key(Key::Digit(5)),
                HostEvent::Remote(RemoteRequest::new("stop", Some(2))),
                HostEvent::InputClosed,
            ]
        );
    }

    #[test]
    fn test_reader_stops_when_host_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        read_terminal_input("1\n2\n".as_bytes(), &tx);
    }
}
