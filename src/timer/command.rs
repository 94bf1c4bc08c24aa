//! Remote command decoding
//!
//! External triggers (a `timer://` URL or the process arguments) carry a free
//! form command string and an optional 1-based window index. Both reduce to a
//! [`RemoteRequest`], whose command decodes to a [`Command`].

use serde::{Deserialize, Serialize};

/// Remote commands accept durations up to 24 hours, inclusive
pub const MAX_REMOTE_SECONDS: f64 = 24.0 * 60.0 * 60.0;

/// URL scheme accepted by [`RemoteRequest::from_url`]
pub const URL_SCHEME: &str = "timer";

/// Decoded action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    NewWindow,
    Stop,
    Reset,
    TogglePause,
    StartTimer(f64),
    Invalid,
}

impl Command {
    /// Decode a command string. Never fails: anything unusable is
    /// [`Command::Invalid`].
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "new" => Command::NewWindow,
            "stop" => Command::Stop,
            "reset" => Command::Reset,
            "pause" => Command::TogglePause,
            _ => parse_duration(input)
                .map(Command::StartTimer)
                .unwrap_or(Command::Invalid),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Command::Invalid)
    }
}

/// `M:S` (fractional seconds allowed) or decimal minutes, in seconds
fn parse_duration(input: &str) -> Option<f64> {
    let seconds = match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: f64 = minutes.trim().parse().ok()?;
            let seconds: f64 = seconds.trim().parse().ok()?;
            minutes * 60.0 + seconds
        }
        None => input.parse::<f64>().ok()? * 60.0,
    };

    (seconds.is_finite() && seconds > 0.0 && seconds <= MAX_REMOTE_SECONDS).then_some(seconds)
}

/// A command addressed to a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub command: String,
    /// 1-based; `None` means the first window
    pub window: Option<i64>,
}

impl RemoteRequest {
    pub fn new(command: impl Into<String>, window: Option<i64>) -> Self {
        Self {
            command: command.into(),
            window,
        }
    }

    pub fn command(&self) -> Command {
        Command::parse(&self.command)
    }

    /// The addressed window, defaulting to 1
    pub fn window_index(&self) -> i64 {
        self.window.unwrap_or(1)
    }

    /// Decode `timer://<command>[?window=N]` or `timer:<command>`
    pub fn from_url(url: &str) -> Result<Self, String> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| format!("Missing scheme in URL: {}", url))?;
        if !scheme.eq_ignore_ascii_case(URL_SCHEME) {
            return Err(format!("Unsupported URL scheme: {}", scheme));
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let command = percent_decode(path.trim_matches('/'))?;
        if command.is_empty() {
            return Err(format!("Missing command in URL: {}", url));
        }

        let mut window = None;
        for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "window" {
                let value = percent_decode(value)?;
                window = Some(
                    value
                        .parse::<i64>()
                        .map_err(|e| format!("Invalid window index '{}': {}", value, e))?,
                );
            }
        }

        Ok(Self { command, window })
    }
}

fn percent_decode(input: &str) -> Result<String, String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = input
                    .get(i + 1..i + 3)
                    .ok_or_else(|| format!("Truncated escape in '{}'", input))?;
                if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(format!("Invalid escape '%{}' in '{}'", hex, input));
                }
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("Invalid escape '%{}' in '{}'", hex, input))?;
                decoded.push(byte);
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(decoded).map_err(|e| format!("URL is not valid UTF-8: {}", e))
}
