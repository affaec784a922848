//! Route-chain execution.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use fleetwatch_config::ChainsConfig;
use fleetwatch_protocols::{ChainKey, DueStep, HttpSender, RouteRepository, StepStatus};
use fleetwatch_workqueue::WorkerPool;

use crate::error::ChainError;
use crate::propagate::Carry;
use crate::request::build_request;

/// Counts from one executor run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChainRunSummary {
    pub chains: usize,
    pub executed: usize,
    pub failed: usize,
}

/// Runs a single chain. Owns nothing mutable; each chain gets its own
/// outcome map.
struct ChainRunner {
    http: Arc<dyn HttpSender>,
    token_marker: String,
}

impl ChainRunner {
    async fn run(&self, key: ChainKey, steps: Vec<DueStep>) -> HashMap<i64, StepStatus> {
        let mut outcomes = HashMap::with_capacity(steps.len());
        let mut carry = Carry::default();

        for due in &steps {
            let step = &due.step;
            let status = match self.execute(due, &carry).await {
                Ok(next) => {
                    carry = next;
                    StepStatus::Success
                }
                Err(status) => status,
            };

            debug!(chain = %key, step_id = step.id, status = %status, "Step finished");
            outcomes.insert(step.id, status);

            if status.is_failure() {
                info!(chain = %key, step_id = step.id, status = %status, "Chain halted");
                break;
            }
        }

        outcomes
    }

    /// Run one step. On success returns the values carried into the next step.
    async fn execute(&self, due: &DueStep, carry: &Carry) -> Result<Carry, StepStatus> {
        let step = &due.step;

        let request = build_request(&due.endpoint, step, carry).map_err(|e| {
            warn!(step_id = step.id, path = %step.path, error = %e, "Invalid step URL");
            StepStatus::FailedRequest
        })?;

        let reply = self.http.send(request).await.map_err(|e| {
            warn!(step_id = step.id, error = %e, "Step request failed");
            StepStatus::FailedRequest
        })?;

        if reply.status != step.expected_status {
            return Err(StepStatus::FailedStatusCode);
        }
        if reply.body.len() != step.expected_body.len() {
            return Err(StepStatus::FailedDifferentBody);
        }

        Carry::extract(step, &reply.body, &self.token_marker)
    }
}

/// Runs every due chain and records the step outcomes in one batch.
pub struct RouteChainExecutor {
    routes: Arc<dyn RouteRepository>,
    runner: Arc<ChainRunner>,
    pool: WorkerPool,
}

impl RouteChainExecutor {
    pub fn new(
        routes: Arc<dyn RouteRepository>,
        http: Arc<dyn HttpSender>,
        config: &ChainsConfig,
        workers: usize,
    ) -> Self {
        Self {
            routes,
            runner: Arc::new(ChainRunner {
                http,
                token_marker: config.token_marker.clone(),
            }),
            pool: WorkerPool::new(workers),
        }
    }

    /// Execute all due chains.
    ///
    /// Chains run concurrently; steps within a chain run strictly in order
    /// and the chain stops at its first failed step. Only repository
    /// failures are returned.
    pub async fn run_due_chains(&self) -> Result<ChainRunSummary, ChainError> {
        let due = self.routes.list_due_steps().await.map_err(|e| {
            error!(error = %e, "Failed to list due chain steps");
            ChainError::Repository(e)
        })?;

        if due.is_empty() {
            debug!("No chains due");
            return Ok(ChainRunSummary::default());
        }

        let groups = group_chains(due);
        let chains = groups.len();

        let runner = Arc::clone(&self.runner);
        let (results, _) = self
            .pool
            .run(groups.into_iter().collect(), move |(key, steps)| {
                let runner = Arc::clone(&runner);
                async move { Ok::<_, Infallible>(runner.run(key, steps).await) }
            })
            .await
            .into_parts();

        let mut outcomes = HashMap::new();
        for chain_outcomes in results {
            outcomes.extend(chain_outcomes);
        }

        let summary = ChainRunSummary {
            chains,
            executed: outcomes.len(),
            failed: outcomes.values().filter(|s| s.is_failure()).count(),
        };

        self.routes
            .record_step_outcomes(&outcomes)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to record step outcomes");
                ChainError::Repository(e)
            })?;

        info!(
            chains = summary.chains,
            executed = summary.executed,
            failed = summary.failed,
            "Route chains complete"
        );
        Ok(summary)
    }
}

/// Group due steps per chain, head first and the rest in fetch order.
pub fn group_chains(due: Vec<DueStep>) -> BTreeMap<ChainKey, Vec<DueStep>> {
    let mut groups: BTreeMap<ChainKey, Vec<DueStep>> = BTreeMap::new();
    for step in due {
        groups.entry(step.step.chain_key()).or_default().push(step);
    }
    for steps in groups.values_mut() {
        steps.sort_by_key(|d| !d.step.is_head());
    }
    groups
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
