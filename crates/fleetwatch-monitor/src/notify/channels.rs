//! Notification channels and recipient grouping.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;
use url::Url;

use fleetwatch_protocols::{EmailMessage, MailError, MailSender, Recipient};

/// Webhook URL reduced to scheme and host. The path of a chat webhook is
/// its credential and never goes to logs or errors.
pub fn redact_webhook(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}/***", url.scheme(), host),
            None => "<webhook>".to_string(),
        },
        Err(_) => "<webhook>".to_string(),
    }
}

/// Chat webhook flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookChannel {
    Slack,
    Discord,
}

impl WebhookChannel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Discord => "discord",
        }
    }

    /// Webhook body carrying `text` as the message.
    pub fn payload(&self, text: &str, username: &str) -> Value {
        match self {
            Self::Slack => json!({ "text": text, "username": username }),
            Self::Discord => json!({ "content": text, "username": username }),
        }
    }
}

/// Recipients grouped per channel. Webhook lines are grouped by destination
/// URL so each URL gets a single message.
#[derive(Debug, Default)]
pub struct Buckets {
    pub slack: BTreeMap<String, Vec<String>>,
    pub discord: BTreeMap<String, Vec<String>>,
    pub email: Vec<EmailMessage>,
}

/// Split recipients into per-channel buckets. A recipient lands in every
/// channel it has enabled with a non-blank destination.
pub fn group_recipients(recipients: &[Recipient]) -> Buckets {
    let mut buckets = Buckets::default();

    for recipient in recipients {
        let line = recipient.message_line();

        if let Some(url) = recipient.slack_destination() {
            buckets
                .slack
                .entry(url.to_string())
                .or_default()
                .push(line.clone());
        }
        if let Some(url) = recipient.discord_destination() {
            buckets
                .discord
                .entry(url.to_string())
                .or_default()
                .push(line.clone());
        }
        if let Some(address) = recipient.email_destination() {
            buckets.email.push(EmailMessage {
                to: address.to_string(),
                subject: format!("{} is now {}", recipient.target_name, recipient.status),
                body: line,
            });
        }
    }

    buckets
}

/// Mail sender that only logs. Used when no mail transport is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "Email notification (log only)");
        Ok(())
    }
}
