//! # Fleetwatch Daemon
//!
//! The fleet monitor loop: every interval it probes the fleet, notifies
//! recipients about status changes and runs the due route chains. Shutdown
//! is driven by a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! that OS signals cancel.

pub mod error;
pub mod runloop;
pub mod signal;

pub use error::DaemonError;
pub use runloop::{CycleReport, FleetMonitor};
pub use signal::SignalHandler;
