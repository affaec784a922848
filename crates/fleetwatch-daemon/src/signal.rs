//! OS signal handling.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::DaemonError;

/// Cancels a shutdown token when the process is asked to stop.
#[derive(Clone)]
pub struct SignalHandler {
    shutdown: CancellationToken,
}

impl SignalHandler {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }

    /// Token cancelled on shutdown.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Request shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Install SIGTERM and SIGINT handlers.
    #[cfg(unix)]
    pub fn install(&self) -> Result<(), DaemonError> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
        let mut sigint =
            signal(SignalKind::interrupt()).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;

        let handler = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
                _ = handler.shutdown.cancelled() => return,
            }
            handler.request_shutdown();
        });

        info!("OS signal handlers installed (SIGTERM, SIGINT)");
        Ok(())
    }

    /// Install a Ctrl+C handler (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn install(&self) -> Result<(), DaemonError> {
        let handler = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        info!("Received Ctrl+C");
                        handler.request_shutdown();
                    }
                }
                _ = handler.shutdown.cancelled() => {}
            }
        });

        info!("OS signal handlers installed (Ctrl+C only)");
        Ok(())
    }
}
