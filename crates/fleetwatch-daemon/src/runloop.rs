//! The fleet monitor loop.
//!
//! Each cycle runs the status prober, dispatches notifications for the
//! targets whose status changed and then runs the due route chains.
//! Cancellation is only observed between cycles; an in-flight cycle always
//! runs to completion.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fleetwatch_chains::{ChainRunSummary, RouteChainExecutor};
use fleetwatch_monitor::{DispatchSummary, Notifier, StatusProber};

/// What one cycle did.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Targets probed this cycle.
    pub probed: usize,
    /// Target ids whose status changed.
    pub changed: Vec<i64>,
    /// Whether the snapshot batch was stored.
    pub persisted: bool,
    /// Cycle-fatal probe failure, if any.
    pub probe_error: Option<String>,
    pub notifications: Option<DispatchSummary>,
    pub notify_error: Option<String>,
    pub chains: Option<ChainRunSummary>,
    pub chain_error: Option<String>,
}

impl CycleReport {
    /// True when every stage finished without error.
    pub fn is_clean(&self) -> bool {
        self.probe_error.is_none()
            && self.notify_error.is_none()
            && self.chain_error.is_none()
            && (self.persisted || self.probed == 0)
    }
}

/// Periodic probe, notify and chain-test loop.
pub struct FleetMonitor {
    prober: StatusProber,
    notifier: Notifier,
    executor: RouteChainExecutor,
    interval: Duration,
}

impl FleetMonitor {
    pub fn new(
        prober: StatusProber,
        notifier: Notifier,
        executor: RouteChainExecutor,
        interval: Duration,
    ) -> Self {
        Self {
            prober,
            notifier,
            executor,
            // A zero period panics in tokio::time::interval.
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Run cycles until `shutdown` is cancelled. The first cycle starts
    /// immediately.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Fleet monitor started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    cycles += 1;
                    let report = self.run_once().await;
                    if !report.is_clean() {
                        warn!(cycle = cycles, "Cycle finished with errors");
                    }
                }
            }
        }

        info!(cycles, "Fleet monitor stopped");
    }

    /// Run a single probe, notify and chain cycle.
    ///
    /// A probe failure skips notification for the cycle; the chains still
    /// run. Failures are logged and recorded in the report.
    pub async fn run_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.prober.check_fleet_status().await {
            Ok(check) => {
                report.probed = check.snapshots.len();
                report.persisted = check.is_persisted();
                report.changed = check.changed.iter().map(|s| s.target_id).collect();

                if let Some(e) = &check.persist_error {
                    warn!(error = %e, "Status history not stored, notifying anyway");
                }

                match self.notifier.dispatch(&check.changed).await {
                    Ok(summary) => report.notifications = Some(summary),
                    Err(e) => {
                        error!(error = %e, "Notification dispatch failed");
                        report.notify_error = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Fleet check failed, skipping notifications");
                report.probe_error = Some(e.to_string());
            }
        }

        match self.executor.run_due_chains().await {
            Ok(summary) => report.chains = Some(summary),
            Err(e) => {
                error!(error = %e, "Route chain run failed");
                report.chain_error = Some(e.to_string());
            }
        }

        debug!(
            probed = report.probed,
            changed = report.changed.len(),
            "Cycle complete"
        );
        report
    }
}

#[cfg(test)]
#[path = "runloop_tests.rs"]
mod tests;
