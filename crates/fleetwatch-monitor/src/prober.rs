//! Fleet liveness probing.
//!
//! One cycle fetches every target, probes them on a bounded pool, caches
//! each snapshot, persists the batch once and reports which targets changed
//! status since the last cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use fleetwatch_config::ProberConfig;
use fleetwatch_protocols::{
    CacheStore, CachedStatus, ControlPlaneClient, ControlPlaneConnector, ControlPlaneError, StatusSnapshot,
    TargetDescriptor, TargetRepository,
};
use fleetwatch_workqueue::WorkerPool;

use crate::error::ProberError;

/// Result of one fleet check.
#[derive(Debug, Default)]
pub struct FleetCheck {
    /// Every snapshot produced this cycle.
    pub snapshots: Vec<StatusSnapshot>,
    /// Snapshots whose status differs from the target's last known status.
    pub changed: Vec<StatusSnapshot>,
    /// Set when persisting the batch failed. `changed` is still valid.
    pub persist_error: Option<ProberError>,
}

impl FleetCheck {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

struct ProbeOutcome {
    snapshot: StatusSnapshot,
    changed: bool,
}

/// Per-cycle probe context shared by the workers.
struct Probe {
    client: Arc<dyn ControlPlaneClient>,
    cache: Arc<dyn CacheStore>,
    dial_timeout: Duration,
    status_ttl: Duration,
}

impl Probe {
    async fn run(&self, target: TargetDescriptor) -> Result<ProbeOutcome, ControlPlaneError> {
        let snapshot = if target.containerized {
            let state = self
                .client
                .inspect_container(&target.container_ref())
                .await
                .inspect_err(|e| {
                    warn!(target_id = target.id, error = %e, "Container inspect failed, skipping target");
                })?;
            StatusSnapshot::observed(target.id, state.status, state.started_at, Utc::now())
        } else {
            let reachable = self.dial(&target.socket_addr()).await;
            StatusSnapshot::reachability(target.id, reachable, Utc::now())
        };

        self.cache_snapshot(target.owner_id, &snapshot).await;

        let changed = snapshot.status != target.status;
        if changed {
            debug!(
                target_id = target.id,
                from = %target.status,
                to = %snapshot.status,
                "Status changed"
            );
        }

        Ok(ProbeOutcome { snapshot, changed })
    }

    async fn dial(&self, addr: &str) -> bool {
        matches!(
            tokio::time::timeout(self.dial_timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        )
    }

    async fn cache_snapshot(&self, owner_id: i64, snapshot: &StatusSnapshot) {
        let key = StatusSnapshot::cache_key(snapshot.target_id);
        let raw = match serde_json::to_string(&CachedStatus::new(owner_id, snapshot.clone())) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key, error = %e, "Failed to encode status snapshot");
                return;
            }
        };
        if let Err(e) = self.cache.set(&key, raw, self.status_ttl).await {
            warn!(key, error = %e, "Failed to cache status snapshot");
        }
    }
}

/// Probes every target and detects status changes.
pub struct StatusProber {
    targets: Arc<dyn TargetRepository>,
    cache: Arc<dyn CacheStore>,
    control_plane: Arc<dyn ControlPlaneConnector>,
    pool: WorkerPool,
    dial_timeout: Duration,
    status_ttl: Duration,
}

impl StatusProber {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        cache: Arc<dyn CacheStore>,
        control_plane: Arc<dyn ControlPlaneConnector>,
        config: &ProberConfig,
        workers: usize,
    ) -> Self {
        Self {
            targets,
            cache,
            control_plane,
            pool: WorkerPool::new(workers),
            dial_timeout: config.dial_timeout(),
            status_ttl: config.status_ttl(),
        }
    }

    /// Override the TCP dial timeout.
    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Run one fleet check.
    ///
    /// Fails only when targets cannot be listed or the control plane is
    /// unreachable. A container that cannot be inspected is skipped. A
    /// persistence failure is reported in [`FleetCheck::persist_error`]
    /// alongside the changes.
    pub async fn check_fleet_status(&self) -> Result<FleetCheck, ProberError> {
        let targets = self.targets.list_targets_to_check().await.map_err(|e| {
            error!(error = %e, "Failed to list targets");
            ProberError::Repository(e)
        })?;

        if targets.is_empty() {
            debug!("No targets to check");
            return Ok(FleetCheck::default());
        }

        let client = self.control_plane.connect().await.map_err(|e| {
            error!(error = %e, "Control plane connection failed, aborting cycle");
            ProberError::ControlPlaneUnreachable(e.to_string())
        })?;

        let probe = Arc::new(Probe {
            client: Arc::clone(&client),
            cache: Arc::clone(&self.cache),
            dial_timeout: self.dial_timeout,
            status_ttl: self.status_ttl,
        });

        let total = targets.len();
        let outcome = self
            .pool
            .run(targets, move |target| {
                let probe = Arc::clone(&probe);
                async move { probe.run(target).await }
            })
            .await;

        client.close().await;

        let mut check = FleetCheck::default();
        for probed in outcome.results {
            if probed.changed {
                check.changed.push(probed.snapshot.clone());
            }
            check.snapshots.push(probed.snapshot);
        }

        if !check.snapshots.is_empty() {
            if let Err(e) = self.targets.record_statuses(&check.snapshots).await {
                error!(error = %e, "Failed to persist status snapshots");
                check.persist_error = Some(ProberError::Repository(e));
            }
        }

        info!(
            targets = total,
            probed = check.snapshots.len(),
            skipped = outcome.errors.len(),
            changed = check.changed.len(),
            "Fleet check complete"
        );

        Ok(check)
    }
}

#[cfg(test)]
#[path = "prober_tests.rs"]
mod tests;
