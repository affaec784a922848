//! One-shot commands.

use std::path::Path;

use tracing::info;

use fleetwatch_chains::{validate_chain, ChainRegistrar};
use fleetwatch_protocols::RouteStep;
use fleetwatch_store_sqlite::SqliteStore;

use crate::adapters::{FleetFile, Services};

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

fn read_chain(path: &Path) -> Result<Vec<RouteStep>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run one fleet-check cycle and print the changed targets.
pub(crate) async fn check(services: &Services) -> Result<(), Box<dyn std::error::Error>> {
    let report = services.monitor.run_once().await;

    println!("Probed {} target(s)", report.probed);
    if report.changed.is_empty() {
        println!("No status changes");
    } else {
        for id in &report.changed {
            println!("  target {} changed", id);
        }
    }
    if let Some(summary) = &report.chains {
        println!(
            "Chains: {} run, {} step(s) executed, {} failed",
            summary.chains, summary.executed, summary.failed
        );
    }

    match report.probe_error.or(report.notify_error).or(report.chain_error) {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Validate a chain file without storing it. Returns the step count.
pub(crate) fn validate_chain_file(path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let steps = read_chain(path)?;
    validate_chain(&steps)?;
    Ok(steps.len())
}

/// Validate and store a chain file. Returns the step count.
pub(crate) async fn register_chain_file(
    registrar: &ChainRegistrar,
    app_id: i64,
    chain_name: &str,
    path: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let steps = read_chain(path)?;
    let stored = registrar.register(app_id, chain_name, steps).await?;
    Ok(stored.len())
}

/// Upsert owners and targets from a fleet file.
pub(crate) async fn import_fleet_file(
    store: &SqliteStore,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let fleet: FleetFile = serde_json::from_str(&content)?;
    let (owners, targets) = fleet.import(store).await?;
    info!(owners, targets, "Fleet imported");
    println!("Imported {} owner(s) and {} target(s)", owners, targets);
    Ok(())
}
