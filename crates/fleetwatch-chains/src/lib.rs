//! # Fleetwatch Chains
//!
//! Chained HTTP acceptance tests. A chain is an ordered list of
//! [`RouteStep`](fleetwatch_protocols::RouteStep)s for one application where
//! values from one step's response flow into the next step's request.
//!
//! - [`validate_chain`] rejects malformed chains before they are stored
//! - [`ChainRegistrar`] validates and persists a chain
//! - [`RouteChainExecutor`] runs every due chain and records step outcomes

pub mod error;
pub mod executor;
pub mod propagate;
pub mod registrar;
pub mod request;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use error::{ChainError, ValidationKind};
pub use executor::{ChainRunSummary, RouteChainExecutor};
pub use propagate::Carry;
pub use registrar::ChainRegistrar;
pub use validate::{chain_order, path_placeholders, validate_chain};
