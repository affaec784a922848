//! Chain registration.

use std::sync::Arc;

use tracing::{info, warn};

use fleetwatch_protocols::{RouteRepository, RouteStep, StepStatus};

use crate::error::ChainError;
use crate::validate::{chain_order, validate_chain};

/// Validates chains and hands accepted ones to the route repository.
pub struct ChainRegistrar {
    routes: Arc<dyn RouteRepository>,
}

impl ChainRegistrar {
    pub fn new(routes: Arc<dyn RouteRepository>) -> Self {
        Self { routes }
    }

    /// Validate and store a chain.
    ///
    /// `steps` use chain-local ids for their parent links; the repository
    /// assigns the stored ids. Steps are stored head first in link order
    /// with status `unknown`. Nothing is stored if validation fails.
    pub async fn register(
        &self,
        app_id: i64,
        chain_name: &str,
        steps: Vec<RouteStep>,
    ) -> Result<Vec<RouteStep>, ChainError> {
        if let Err(e) = validate_chain(&steps) {
            warn!(app_id, chain = chain_name, error = %e, "Chain rejected");
            return Err(e);
        }

        let order = chain_order(&steps)?;
        let mut slots: Vec<Option<RouteStep>> = steps.into_iter().map(Some).collect();
        let ordered: Vec<RouteStep> = order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .map(|step| {
                let parent_id = step.parent_id;
                let mut step = step.in_chain(app_id, chain_name, parent_id);
                step.status = StepStatus::Unknown;
                step
            })
            .collect();

        let stored = self
            .routes
            .register_chain(app_id, chain_name, ordered)
            .await?;

        info!(app_id, chain = chain_name, steps = stored.len(), "Chain registered");
        Ok(stored)
    }
}
