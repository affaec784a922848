//! Cache-aside lookup with write-back.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use fleetwatch_protocols::{CacheError, CacheStore};

/// Failure of a [`cached_lookup`].
#[derive(Debug, Error)]
pub enum LookupError<E> {
    /// The entry exists but could not be read or decoded.
    #[error("cache read failed: {0}")]
    Cache(CacheError),

    /// The fallback loader failed.
    #[error(transparent)]
    Source(E),
}

/// Read `key` from the cache, falling back to `loader`.
///
/// An `exists` failure is treated like a miss. A present entry that cannot
/// be read or decoded is an error. Values produced by `loader` are written
/// back with `ttl`; write-back failures are only logged.
pub async fn cached_lookup<T, E, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    loader: F,
) -> Result<T, LookupError<E>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let present = match cache.exists(key).await {
        Ok(count) => count > 0,
        Err(e) => {
            warn!(key, error = %e, "cache exists check failed, reading from store");
            false
        }
    };

    if present {
        let raw = cache.get(key).await.map_err(LookupError::Cache)?;
        let value = serde_json::from_str(&raw)
            .map_err(|e| LookupError::Cache(CacheError::from(e)))?;
        debug!(key, "cache hit");
        return Ok(value);
    }

    let value = loader().await.map_err(LookupError::Source)?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, raw, ttl).await {
                warn!(key, error = %e, "cache write-back failed");
            }
        }
        Err(e) => warn!(key, error = %e, "failed to encode value for cache"),
    }

    Ok(value)
}
