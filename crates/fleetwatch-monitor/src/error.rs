//! Monitor errors.

use thiserror::Error;

use fleetwatch_protocols::RepositoryError;

/// Status prober errors.
#[derive(Debug, Error)]
pub enum ProberError {
    /// Fetching targets or persisting snapshots failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The control plane could not be reached; the whole cycle is aborted.
    #[error("Control plane unreachable: {0}")]
    ControlPlaneUnreachable(String),

    /// Cache read or decode failure. Details are logged, never returned.
    #[error("Internal error")]
    Internal,
}

/// Notification fan-out errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Recipient resolution failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A webhook could not be sent.
    #[error("Delivery to {destination} failed: {message}")]
    Delivery { destination: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_hides_details() {
        assert_eq!(ProberError::Internal.to_string(), "Internal error");
    }

    #[test]
    fn test_repository_error_from() {
        let err = ProberError::from(RepositoryError::Query("locked".to_string()));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_delivery_error_display() {
        let err = NotifyError::Delivery {
            destination: "https://hooks.slack.test/a".to_string(),
            message: "connection reset".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("hooks.slack.test"));
        assert!(display.contains("connection reset"));
    }
}
