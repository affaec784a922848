//! Status-change notifications.

mod channels;
mod fanout;

pub use channels::{group_recipients, Buckets, LogMailer, WebhookChannel};
pub use fanout::{DispatchSummary, Notifier};
