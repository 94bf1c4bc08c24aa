//! Desktop notification delivery through `notify-send`

use tokio::process::Command;
use tracing::{debug, info};

use super::AlertSound;

/// Title shown when a countdown completes
pub const COMPLETION_TITLE: &str = "It's time! 🕘";

/// Build the `notify-send` arguments for a completion
pub fn notification_args(title: &str, body: &str, sound: AlertSound) -> Vec<String> {
    let mut args = vec!["--urgency=critical".to_string(), "--app-name=desk-timer".to_string()];
    if let Some(name) = sound.sound_name() {
        args.push(format!("--hint=string:sound-name:{}", name));
    }
    args.push(title.to_string());
    if !body.is_empty() {
        args.push(body.to_string());
    }
    args
}

/// Deliver a completion notification
pub async fn deliver_notification(
    title: &str,
    body: &str,
    sound: AlertSound,
) -> Result<(), String> {
    debug!("Delivering notification '{}'", title);

    let output = Command::new("notify-send")
        .args(notification_args(title, body, sound))
        .output()
        .await
        .map_err(|e| format!("Failed to execute notify-send: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("notify-send failed: {}", stderr));
    }

    info!("Notification delivered");
    Ok(())
}

/// Check if notify-send is available on the system
pub async fn check_notify_send_available() -> Result<(), String> {
    Command::new("notify-send")
        .arg("--version")
        .output()
        .await
        .map_err(|_| {
            "notify-send is not available; falling back to the terminal bell".to_string()
        })?;

    info!("notify-send is available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_sound() {
        let args = notification_args(COMPLETION_TITLE, "Window 2", AlertSound::Second);
        assert_eq!(args[0], "--urgency=critical");
        assert!(args.contains(&"--hint=string:sound-name:alert-sound-2".to_string()));
        assert_eq!(args[args.len() - 2], COMPLETION_TITLE);
        assert_eq!(args[args.len() - 1], "Window 2");
    }

    #[test]
    fn test_args_silent_without_body() {
        let args = notification_args(COMPLETION_TITLE, "", AlertSound::Silent);
        assert!(!args.iter().any(|a| a.contains("sound-name")));
        assert_eq!(args.last().map(String::as_str), Some(COMPLETION_TITLE));
    }
}
