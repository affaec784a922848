//! # Fleetwatch Protocols
//!
//! Domain types and the narrow contracts through which the fleetwatch core
//! talks to its collaborators. Contains only interface definitions - no
//! implementations.
//!
//! ## Contracts
//!
//! - [`TargetRepository`] - monitored targets, status history, recipients
//! - [`RouteRepository`] - route-chain steps and their outcomes
//! - [`CacheStore`] - key-value store with per-key TTL
//! - [`ControlPlaneConnector`] / [`ControlPlaneClient`] - container runtime state
//! - [`HttpSender`] - generic JSON-over-HTTP sender
//! - [`MailSender`] - outbound email delivery

pub mod cache;
pub mod control_plane;
pub mod error;
pub mod http;
pub mod mail;
pub mod repository;
pub mod types;

pub use cache::CacheStore;
pub use control_plane::{ContainerState, ControlPlaneClient, ControlPlaneConnector};
pub use error::{CacheError, ControlPlaneError, HttpError, MailError, RepositoryError};
pub use http::{HttpMethod, HttpReply, HttpRequest, HttpSender};
pub use mail::{EmailMessage, MailSender};
pub use repository::{RouteRepository, TargetRepository};
pub use types::*;
