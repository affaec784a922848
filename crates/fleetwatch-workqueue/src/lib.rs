//! # Fleetwatch Workqueue
//!
//! Fan-out / fan-in over a bounded set of workers.
//!
//! Every concurrent site in fleetwatch (status probing, webhook delivery,
//! chain groups) goes through [`run_bounded`]: a fixed number of workers
//! pull items from one shared queue until it is empty, and the caller
//! resumes only after every worker has finished.

pub mod pool;

pub use pool::{run_bounded, PoolOutcome, WorkerPool};
