//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub prober: ProberConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub chains: ChainsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub control_plane: ControlPlaneConfig,
}

/// Status endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Number of daily log files to keep.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.fleetwatch/logs".to_string()
}

fn default_max_log_files() -> usize {
    14
}

/// Fleet monitor loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between fleet-check cycles.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Worker pool size (0 = host available parallelism).
    #[serde(default)]
    pub workers: usize,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Resolved pool size for every bounded pool.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            available_parallelism()
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            workers: 0,
        }
    }
}

fn default_interval() -> u64 {
    60
}

/// Host parallelism, falling back to a single worker.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Status prober configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProberConfig {
    /// TCP dial timeout for network targets.
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout_secs: u64,

    /// TTL of cached status snapshots.
    #[serde(default = "default_status_ttl")]
    pub status_ttl_secs: u64,
}

impl ProberConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            dial_timeout_secs: default_dial_timeout(),
            status_ttl_secs: default_status_ttl(),
        }
    }
}

fn default_dial_timeout() -> u64 {
    3
}

fn default_status_ttl() -> u64 {
    120
}

/// Notification fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// `username` field of webhook payloads.
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_username() -> String {
    "fleetwatch".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

/// Route-chain executor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainsConfig {
    /// Marker identifying a test token in a response value; a matching value
    /// becomes the next step's bearer token.
    #[serde(default = "default_token_marker")]
    pub token_marker: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            token_marker: default_token_marker(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_token_marker() -> String {
    "eyJ".to_string()
}

/// Durable storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> String {
    "~/.fleetwatch/fleetwatch.db".to_string()
}

/// Container control-plane configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    /// Docker Engine API base URL.
    #[serde(default = "default_docker_host")]
    pub docker_host: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            docker_host: default_docker_host(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_docker_host() -> String {
    "http://127.0.0.1:2375".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.monitor.interval(), Duration::from_secs(60));
        assert_eq!(config.prober.dial_timeout(), Duration::from_secs(3));
        assert_eq!(config.prober.status_ttl(), Duration::from_secs(120));
        assert_eq!(config.notify.username, "fleetwatch");
        assert_eq!(config.chains.token_marker, "eyJ");
    }

    #[test]
    fn test_worker_count_defaults_to_parallelism() {
        let config = MonitorConfig::default();
        assert_eq!(config.worker_count(), available_parallelism());
        assert!(config.worker_count() >= 1);
    }
}
