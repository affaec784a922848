//! Durable storage contracts.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::types::{DueStep, Recipient, RouteStep, StatusSnapshot, StepStatus, TargetDescriptor};

/// Monitored targets, their status history and notification settings.
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// All targets that need a liveness check this cycle.
    async fn list_targets_to_check(&self) -> Result<Vec<TargetDescriptor>, RepositoryError>;

    /// Append a batch of snapshots to the status history and update each
    /// target's last known status.
    async fn record_statuses(&self, batch: &[StatusSnapshot]) -> Result<(), RepositoryError>;

    /// Recipients interested in the given status changes.
    async fn resolve_recipients(
        &self,
        statuses: &[StatusSnapshot],
    ) -> Result<Vec<Recipient>, RepositoryError>;

    /// Latest recorded snapshot for a target owned by `owner_id`.
    async fn get_status(
        &self,
        target_id: i64,
        owner_id: i64,
    ) -> Result<StatusSnapshot, RepositoryError>;
}

/// Route-chain steps and their outcomes.
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Steps due for testing, each joined with its application's endpoint.
    async fn list_due_steps(&self) -> Result<Vec<DueStep>, RepositoryError>;

    /// Batch update of step outcomes keyed by step id.
    async fn record_step_outcomes(
        &self,
        outcomes: &HashMap<i64, StepStatus>,
    ) -> Result<(), RepositoryError>;

    /// Persist an already validated chain. Returns the stored steps with
    /// their assigned ids and parent links.
    async fn register_chain(
        &self,
        app_id: i64,
        chain_name: &str,
        steps: Vec<RouteStep>,
    ) -> Result<Vec<RouteStep>, RepositoryError>;
}
