//! Configuration and CLI argument handling

use clap::Parser;

use crate::{services::AlertSound, timer::RemoteRequest};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "desk-timer")]
#[command(about = "A keyboard-driven countdown timer")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Command for the timer: new, stop, reset, pause, M:S or decimal minutes
    pub command: Option<String>,

    /// 1-based window the command is addressed to
    #[arg(short, long, allow_negative_numbers = true)]
    pub window: Option<i64>,

    /// URL trigger such as timer://2:30?window=1
    #[arg(long, conflicts_with = "command")]
    pub url: Option<String>,

    /// Alert sound: -1 for none, 0-2 to pick a sound
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub sound: i32,

    /// Do not deliver desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Show the badge for the first window at startup
    #[arg(long)]
    pub badge: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn alert_sound(&self) -> AlertSound {
        AlertSound::from_index(self.sound)
    }

    /// The startup command, from the URL or the positional argument
    pub fn remote_request(&self) -> Result<Option<RemoteRequest>, String> {
        if let Some(url) = &self.url {
            let mut request = RemoteRequest::from_url(url)?;
            if request.window.is_none() {
                request.window = self.window;
            }
            return Ok(Some(request));
        }

        Ok(self
            .command
            .as_ref()
            .map(|command| RemoteRequest::new(command.clone(), self.window)))
    }
}
