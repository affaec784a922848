//! # Fleetwatch Monitor
//!
//! Liveness probing and status-change alerting for a fleet of targets.
//!
//! ## Components
//!
//! - [`StatusProber`] - bounded-concurrency fleet check with change detection
//! - [`StatusService`] - cache-first status reads
//! - [`Notifier`] - per-channel webhook fan-out grouped by destination

pub mod cached;
pub mod error;
pub mod notify;
pub mod prober;
pub mod status;

#[cfg(test)]
mod test_support;

pub use cached::{cached_lookup, LookupError};
pub use error::{NotifyError, ProberError};
pub use notify::{DispatchSummary, LogMailer, Notifier, WebhookChannel};
pub use prober::{FleetCheck, StatusProber};
pub use status::StatusService;
