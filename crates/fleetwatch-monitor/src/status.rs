//! Cache-first status reads.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use fleetwatch_protocols::{
    CacheStore, CachedStatus, RepositoryError, StatusSnapshot, TargetRepository,
};

use crate::cached::{cached_lookup, LookupError};
use crate::error::ProberError;

/// Serves the current status of a single target.
pub struct StatusService {
    targets: Arc<dyn TargetRepository>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl StatusService {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self { targets, cache, ttl }
    }

    /// Current snapshot of `target_id`, read from the cache when present and
    /// from the store otherwise.
    ///
    /// Store results are written back to the cache. A cached entry that
    /// cannot be read or decoded yields [`ProberError::Internal`]. A cached
    /// snapshot of a target owned by someone else is not found, exactly as
    /// on the store path.
    pub async fn get_status(
        &self,
        target_id: i64,
        owner_id: i64,
    ) -> Result<StatusSnapshot, ProberError> {
        let key = StatusSnapshot::cache_key(target_id);
        let targets = Arc::clone(&self.targets);

        let cached = cached_lookup(self.cache.as_ref(), &key, self.ttl, || async move {
            let snapshot = targets.get_status(target_id, owner_id).await?;
            Ok::<_, RepositoryError>(CachedStatus::new(owner_id, snapshot))
        })
        .await
        .map_err(|e| match e {
            LookupError::Cache(cause) => {
                error!(target_id, error = %cause, "Cached status unreadable");
                ProberError::Internal
            }
            LookupError::Source(cause) => ProberError::Repository(cause),
        })?;

        if !cached.is_owned_by(owner_id) {
            debug!(target_id, owner_id, "Cached status belongs to another owner");
            return Err(ProberError::Repository(RepositoryError::NotFound(format!(
                "no status for target {} of owner {}",
                target_id, owner_id
            ))));
        }
        Ok(cached.snapshot)
    }
}
