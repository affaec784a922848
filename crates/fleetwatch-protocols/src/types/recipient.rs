//! Notification recipients.

use serde::{Deserialize, Serialize};

/// A resolved notification recipient for one changed target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub target_id: i64,
    pub target_name: String,
    /// Status that triggered the notification.
    pub status: String,
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default)]
    pub slack_enabled: bool,
    #[serde(default)]
    pub discord_enabled: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub slack_webhook: Option<String>,
    #[serde(default)]
    pub discord_webhook: Option<String>,
}

impl Recipient {
    /// One digest line: `{id} - {name} - {status}`.
    pub fn message_line(&self) -> String {
        format!("{} - {} - {}", self.target_id, self.target_name, self.status)
    }

    /// Slack webhook URL, if the channel is enabled and configured.
    pub fn slack_destination(&self) -> Option<&str> {
        enabled_destination(self.slack_enabled, self.slack_webhook.as_deref())
    }

    /// Discord webhook URL, if the channel is enabled and configured.
    pub fn discord_destination(&self) -> Option<&str> {
        enabled_destination(self.discord_enabled, self.discord_webhook.as_deref())
    }

    /// Email address, if the channel is enabled and configured.
    pub fn email_destination(&self) -> Option<&str> {
        enabled_destination(self.email_enabled, self.email.as_deref())
    }
}

fn enabled_destination(enabled: bool, destination: Option<&str>) -> Option<&str> {
    match destination {
        Some(dest) if enabled && !dest.trim().is_empty() => Some(dest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            target_id: 4,
            target_name: "billing".to_string(),
            status: "stopped".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_message_line() {
        assert_eq!(recipient().message_line(), "4 - billing - stopped");
    }

    #[test]
    fn test_enabled_without_address_is_excluded() {
        let mut r = recipient();
        r.slack_enabled = true;
        r.slack_webhook = Some("  ".to_string());
        r.discord_enabled = true;
        assert_eq!(r.slack_destination(), None);
        assert_eq!(r.discord_destination(), None);
    }

    #[test]
    fn test_address_without_flag_is_excluded() {
        let mut r = recipient();
        r.email = Some("ops@example.com".to_string());
        assert_eq!(r.email_destination(), None);
        r.email_enabled = true;
        assert_eq!(r.email_destination(), Some("ops@example.com"));
    }
}
