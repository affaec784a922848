//! Mail delivery errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    SendFailed(String),
}
