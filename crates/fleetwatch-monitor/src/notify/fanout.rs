//! Status-change fan-out.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use fleetwatch_config::NotifyConfig;
use fleetwatch_protocols::{
    EmailMessage, HttpRequest, HttpSender, MailSender, StatusSnapshot, TargetRepository,
};
use fleetwatch_workqueue::WorkerPool;

use super::channels::{group_recipients, redact_webhook, WebhookChannel};
use crate::error::NotifyError;

/// Counts of messages handed to each channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub slack: usize,
    pub discord: usize,
    pub email: usize,
}

/// Sends one digest per webhook destination for a batch of status changes.
pub struct Notifier {
    targets: Arc<dyn TargetRepository>,
    http: Arc<dyn HttpSender>,
    mailer: Arc<dyn MailSender>,
    username: String,
    pool: WorkerPool,
}

impl Notifier {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        http: Arc<dyn HttpSender>,
        mailer: Arc<dyn MailSender>,
        config: &NotifyConfig,
        workers: usize,
    ) -> Self {
        Self {
            targets,
            http,
            mailer,
            username: config.username.clone(),
            pool: WorkerPool::new(workers),
        }
    }

    /// Notify every interested recipient about `changed`.
    ///
    /// Slack and Discord groups are delivered concurrently. Non-success
    /// replies are logged; the first transport failure is returned after
    /// every send has completed.
    pub async fn dispatch(&self, changed: &[StatusSnapshot]) -> Result<DispatchSummary, NotifyError> {
        if changed.is_empty() {
            return Ok(DispatchSummary::default());
        }

        let recipients = self.targets.resolve_recipients(changed).await?;
        let buckets = group_recipients(&recipients);
        debug!(
            recipients = recipients.len(),
            slack = buckets.slack.len(),
            discord = buckets.discord.len(),
            email = buckets.email.len(),
            "Dispatching status changes"
        );

        let summary = DispatchSummary {
            slack: buckets.slack.len(),
            discord: buckets.discord.len(),
            email: buckets.email.len(),
        };

        let (slack, discord, ()) = tokio::join!(
            self.deliver_webhooks(WebhookChannel::Slack, buckets.slack),
            self.deliver_webhooks(WebhookChannel::Discord, buckets.discord),
            self.deliver_emails(buckets.email),
        );

        if let Some(e) = slack.or(discord) {
            return Err(e);
        }

        info!(
            slack = summary.slack,
            discord = summary.discord,
            email = summary.email,
            "Status change notifications sent"
        );
        Ok(summary)
    }

    async fn deliver_webhooks(
        &self,
        channel: WebhookChannel,
        groups: BTreeMap<String, Vec<String>>,
    ) -> Option<NotifyError> {
        let deliveries: Vec<(String, String)> = groups
            .into_iter()
            .map(|(url, lines)| (url, lines.join("\n")))
            .collect();

        let http = Arc::clone(&self.http);
        let username = self.username.clone();

        let outcome = self
            .pool
            .run(deliveries, move |(url, text)| {
                let http = Arc::clone(&http);
                let request = HttpRequest::post_json(url.clone(), channel.payload(&text, &username));
                async move {
                    let destination = redact_webhook(&url);
                    match http.send(request).await {
                        Ok(reply) if reply.is_delivered() => Ok(()),
                        Ok(reply) => {
                            warn!(
                                channel = channel.name(),
                                destination = %destination,
                                status = reply.status,
                                "Webhook rejected notification"
                            );
                            Ok(())
                        }
                        Err(e) => Err(NotifyError::Delivery {
                            message: e.to_string().replace(&url, &destination),
                            destination,
                        }),
                    }
                }
            })
            .await;

        for err in &outcome.errors {
            warn!(channel = channel.name(), error = %err, "Webhook delivery failed");
        }
        outcome.into_parts().1
    }

    async fn deliver_emails(&self, messages: Vec<EmailMessage>) {
        for message in &messages {
            if let Err(e) = self.mailer.send(message).await {
                warn!(to = %message.to, error = %e, "Email notification failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
