//! Container control-plane contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ControlPlaneError;

/// Runtime-reported container state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    pub status: String,
    pub started_at: DateTime<Utc>,
}

/// An open control-plane connection, shared read-only by probe workers.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Inspect one container.
    async fn inspect_container(&self, id: &str) -> Result<ContainerState, ControlPlaneError>;

    /// Close the connection at the end of a probe cycle.
    async fn close(&self);
}

/// Opens control-plane connections, one per probe cycle.
#[async_trait]
pub trait ControlPlaneConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ControlPlaneClient>, ControlPlaneError>;
}
