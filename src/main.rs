//! Fleetwatch - fleet liveness monitoring, status-change alerting and
//! chained HTTP acceptance tests.
//!
//! Main entry point for the fleetwatch CLI and daemon.

mod adapters;
mod api;
mod cli;
mod commands;
mod server;

use clap::Parser;
use tracing::{info, warn};

use fleetwatch_chains::ChainRegistrar;
use fleetwatch_config::{ConfigLoader, ConfigValidator};

use crate::adapters::{build_services, open_store};
use crate::cli::{Cli, Commands};
use crate::server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    let warnings = ConfigValidator::validate(&config).into_result()?;

    init_tracing(&config.logging)?;
    info!(config = %cli.config.display(), "Configuration loaded");
    for warning in warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let services = build_services(&config).await?;
            run_server(config, services).await
        }
        Commands::Check => {
            let services = build_services(&config).await?;
            commands::check(&services).await
        }
        Commands::ValidateChain { file } => {
            let steps = commands::validate_chain_file(&file)?;
            println!("Chain is valid ({} steps)", steps);
            Ok(())
        }
        Commands::RegisterChain { app, name, file } => {
            let registrar = ChainRegistrar::new(open_store(&config).await?);
            let steps = commands::register_chain_file(&registrar, app, &name, &file).await?;
            println!("Registered chain {:?} for app {} ({} steps)", name, app, steps);
            Ok(())
        }
        Commands::ImportFleet { file } => {
            let store = open_store(&config).await?;
            commands::import_fleet_file(&store, &file).await
        }
    }
}
