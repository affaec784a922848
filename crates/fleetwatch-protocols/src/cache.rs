//! Key-value cache contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Key-value store with per-key time-to-live.
///
/// A `ttl` of [`Duration::ZERO`] means the key never expires. Concurrent
/// writes to different keys must be safe; no transactional guarantees are
/// assumed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Read the value under `key`. Missing keys are an error.
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    /// Number of live entries under `key` (0 or 1).
    async fn exists(&self, key: &str) -> Result<u64, CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
