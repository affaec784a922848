//! Logging bootstrap and the long-running `run` command.

use std::sync::OnceLock;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fleetwatch_config::{Config, ConfigLoader, LoggingConfig};
use fleetwatch_daemon::SignalHandler;

use crate::adapters::Services;
use crate::api::{create_router, ApiState};

/// Initialize tracing with console and daily rolling file output.
///
/// `RUST_LOG` overrides the configured level.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::expand_path(&logging.dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("fleetwatch")
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the file writer.
    static GUARD: OnceLock<WorkerGuard> = OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(())
}

/// Run the monitor loop and the status endpoint until a shutdown signal.
pub(crate) async fn run_server(
    config: Config,
    services: Services,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting fleetwatch v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let signals = SignalHandler::new(shutdown.clone());
    signals.install()?;

    let Services {
        cache,
        monitor,
        status,
    } = services;

    let purge_every = config.prober.status_ttl().max(Duration::from_secs(1));
    let purge_token = shutdown.clone();
    let purge = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_every);
        loop {
            tokio::select! {
                _ = purge_token.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = cache.purge_expired();
                    if purged > 0 {
                        debug!(purged, "Purged expired cache entries");
                    }
                }
            }
        }
    });

    let monitor_token = shutdown.clone();
    let monitor_task = tokio::spawn(async move { monitor.run(monitor_token).await });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Status endpoint listening on http://{}", addr);

    let app = create_router(ApiState { status });
    let server_token = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Status endpoint stopped");
        signals.request_shutdown();
    }

    // The loop finishes its in-flight cycle before returning.
    if let Err(e) = monitor_task.await {
        error!(error = %e, "Fleet monitor task failed");
    }
    let _ = purge.await;

    info!("Shutting down...");
    served?;
    Ok(())
}
