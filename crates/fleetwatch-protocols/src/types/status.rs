//! Status snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status label for a reachable target.
pub const STATUS_RUNNING: &str = "running";

/// Status label for an unreachable target.
pub const STATUS_STOPPED: &str = "stopped";

/// Point-in-time liveness record for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub target_id: i64,
    pub status: String,
    /// When the target entered `status`.
    pub started_at: DateTime<Utc>,
    /// Seconds spent in `status` at observation time.
    pub duration_secs: i64,
}

impl StatusSnapshot {
    /// Snapshot from a runtime-reported state and start time.
    pub fn observed(
        target_id: i64,
        status: impl Into<String>,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            target_id,
            status: status.into(),
            started_at,
            duration_secs: (now - started_at).num_seconds().max(0),
        }
    }

    /// Snapshot from a TCP reachability check. Duration is not tracked for
    /// network targets and is always zero.
    pub fn reachability(target_id: i64, reachable: bool, now: DateTime<Utc>) -> Self {
        let status = if reachable { STATUS_RUNNING } else { STATUS_STOPPED };
        Self {
            target_id,
            status: status.to_string(),
            started_at: now,
            duration_secs: 0,
        }
    }

    /// Cache key holding the current snapshot of a target.
    pub fn cache_key(target_id: i64) -> String {
        format!("status:{}", target_id)
    }
}

/// Cache payload of a snapshot, tagged with the owner of its target so
/// cache hits can be authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStatus {
    pub owner_id: i64,
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
}

impl CachedStatus {
    pub fn new(owner_id: i64, snapshot: StatusSnapshot) -> Self {
        Self { owner_id, snapshot }
    }

    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}
