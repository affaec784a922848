//! Wiring of the concrete adapters behind the fleetwatch contracts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use fleetwatch_cache_memory::MemoryCache;
use fleetwatch_chains::RouteChainExecutor;
use fleetwatch_config::{Config, ConfigLoader};
use fleetwatch_control_docker::DockerConnector;
use fleetwatch_daemon::FleetMonitor;
use fleetwatch_http_reqwest::ReqwestSender;
use fleetwatch_monitor::{LogMailer, Notifier, StatusProber, StatusService};
use fleetwatch_protocols::{RepositoryError, TargetDescriptor};
use fleetwatch_store_sqlite::{Owner, SqliteStore};

/// Get the .fleetwatch directory path.
pub(crate) fn fleetwatch_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".fleetwatch"))
        .unwrap_or_else(|| PathBuf::from(".fleetwatch"))
}

/// Everything the commands need, built once from the configuration.
pub(crate) struct Services {
    pub cache: Arc<MemoryCache>,
    pub monitor: FleetMonitor,
    pub status: Arc<StatusService>,
}

/// Open the store only; used by commands that never probe.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<SqliteStore>, RepositoryError> {
    let path = ConfigLoader::expand_path(&config.storage.sqlite_path);
    Ok(Arc::new(SqliteStore::open(path).await?))
}

pub(crate) async fn build_services(config: &Config) -> Result<Services, Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let cache = Arc::new(MemoryCache::new());
    let workers = config.monitor.worker_count();

    let control_plane = Arc::new(DockerConnector::new(
        config.control_plane.docker_host.clone(),
        Duration::from_secs(config.control_plane.timeout_secs),
    )?);
    let webhook_http = Arc::new(ReqwestSender::new(Duration::from_secs(config.notify.http_timeout_secs))?);
    let chain_http = Arc::new(ReqwestSender::new(Duration::from_secs(config.chains.http_timeout_secs))?);

    let prober = StatusProber::new(
        store.clone(),
        cache.clone(),
        control_plane,
        &config.prober,
        workers,
    );
    let notifier = Notifier::new(
        store.clone(),
        webhook_http,
        Arc::new(LogMailer),
        &config.notify,
        workers,
    );
    let executor = RouteChainExecutor::new(store.clone(), chain_http, &config.chains, workers);

    info!(workers, interval_secs = config.monitor.interval_secs, "Fleet monitor configured");

    Ok(Services {
        status: Arc::new(StatusService::new(
            store,
            cache.clone(),
            config.prober.status_ttl(),
        )),
        monitor: FleetMonitor::new(prober, notifier, executor, config.monitor.interval()),
        cache,
    })
}

/// Owners and targets loaded by `import-fleet`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FleetFile {
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default)]
    pub targets: Vec<TargetDescriptor>,
}

impl FleetFile {
    /// Upsert owners first so targets can reference them.
    pub async fn import(self, store: &SqliteStore) -> Result<(usize, usize), RepositoryError> {
        let counts = (self.owners.len(), self.targets.len());
        for owner in self.owners {
            store.upsert_owner(owner).await?;
        }
        for target in self.targets {
            store.upsert_target(target).await?;
        }
        Ok(counts)
    }
}
