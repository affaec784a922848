//! CLI definitions for fleetwatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fleetwatch CLI.
#[derive(Parser)]
#[command(name = "fleetwatch")]
#[command(about = "Fleet liveness monitoring and chained HTTP acceptance tests")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true, env = "FLEETWATCH_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the monitor loop and the status endpoint (default)
    Run,

    /// Run a single fleet-check cycle and print the changed targets
    Check,

    /// Validate a chain definition (JSON array of steps)
    ValidateChain {
        /// Path to the chain file
        file: PathBuf,
    },

    /// Validate and store a chain for an application
    RegisterChain {
        /// Owning application (target) id
        #[arg(long)]
        app: i64,

        /// Chain name, unique per application
        #[arg(long)]
        name: String,

        /// Path to the chain file
        file: PathBuf,
    },

    /// Insert or update owners and targets from a JSON fleet file
    ImportFleet {
        /// Path to the fleet file
        file: PathBuf,
    },
}
