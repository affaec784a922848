//! SQLite storage for fleetwatch.
//!
//! Implements both [`TargetRepository`](fleetwatch_protocols::TargetRepository)
//! and [`RouteRepository`](fleetwatch_protocols::RouteRepository) on one
//! database file.

mod routes;
mod schema;
mod store;
mod targets;

pub use store::{Owner, SqliteStore};
