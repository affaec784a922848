//! Route repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use rusqlite::types::Type;

use fleetwatch_protocols::{
    DueStep, Endpoint, RepositoryError, RouteRepository, RouteStep, StepStatus,
};

use crate::store::{query_error, SqliteStore};

/// A chain is due until it has a failed step or no untested step left.
const DUE_STEPS: &str = "
    SELECT s.id, s.app_id, s.chain_name, s.parent_id, s.definition, s.status, t.address, t.port
    FROM route_steps s
    JOIN targets t ON t.id = s.app_id
    JOIN (
        SELECT app_id, chain_name FROM route_steps
        GROUP BY app_id, chain_name
        HAVING SUM(status = 'unknown') > 0 AND SUM(status LIKE 'Failed;%') = 0
    ) due ON due.app_id = s.app_id AND due.chain_name = s.chain_name
    ORDER BY s.app_id, s.chain_name, s.position";

fn conversion_error(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

#[async_trait]
impl RouteRepository for SqliteStore {
    async fn list_due_steps(&self) -> Result<Vec<DueStep>, RepositoryError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(DUE_STEPS)?;
                let steps = stmt
                    .query_map([], |row| {
                        let definition: String = row.get(4)?;
                        let mut step: RouteStep = serde_json::from_str(&definition)
                            .map_err(|e| conversion_error(4, e))?;
                        step.id = row.get(0)?;
                        step.app_id = row.get(1)?;
                        step.chain_name = row.get(2)?;
                        step.parent_id = row.get(3)?;
                        let status: String = row.get(5)?;
                        step.status = status.parse().map_err(|e: String| {
                            conversion_error(5, RepositoryError::Serialization(e))
                        })?;

                        Ok(DueStep {
                            endpoint: Endpoint::new(row.get::<_, String>(6)?, row.get(7)?),
                            step,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(steps)
            })
            .await
            .map_err(query_error)
    }

    async fn record_step_outcomes(
        &self,
        outcomes: &HashMap<i64, StepStatus>,
    ) -> Result<(), RepositoryError> {
        let outcomes: Vec<(i64, String)> = outcomes
            .iter()
            .map(|(id, status)| (*id, status.to_string()))
            .collect();
        let tested_at = Utc::now();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut update = tx.prepare(
                        "UPDATE route_steps SET status = ?1, tested_at = ?2 WHERE id = ?3",
                    )?;
                    for (id, status) in &outcomes {
                        update.execute(params![status, tested_at, id])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(query_error)
    }

    async fn register_chain(
        &self,
        app_id: i64,
        chain_name: &str,
        steps: Vec<RouteStep>,
    ) -> Result<Vec<RouteStep>, RepositoryError> {
        let chain_name = chain_name.to_string();
        let mut definitions = Vec::with_capacity(steps.len());
        for step in &steps {
            let definition = serde_json::to_string(step)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
            definitions.push(definition);
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                // Re-registering a chain replaces it.
                tx.execute(
                    "DELETE FROM route_steps WHERE app_id = ?1 AND chain_name = ?2",
                    params![app_id, chain_name],
                )?;

                let mut assigned: HashMap<i64, i64> = HashMap::with_capacity(steps.len());
                let mut stored = Vec::with_capacity(steps.len());
                for (position, (mut step, definition)) in steps.into_iter().zip(definitions).enumerate() {
                    let parent_id = if step.is_head() {
                        0
                    } else {
                        assigned.get(&step.parent_id).copied().unwrap_or(0)
                    };

                    tx.execute(
                        "INSERT INTO route_steps (app_id, chain_name, position, parent_id, definition, status)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            app_id,
                            chain_name,
                            position as i64,
                            parent_id,
                            definition,
                            StepStatus::Unknown.to_string()
                        ],
                    )?;

                    let id = tx.last_insert_rowid();
                    assigned.insert(step.id, id);

                    step.id = id;
                    step.app_id = app_id;
                    step.chain_name = chain_name.clone();
                    step.parent_id = parent_id;
                    step.status = StepStatus::Unknown;
                    stored.push(step);
                }

                tx.commit()?;
                Ok(stored)
            })
            .await
            .map_err(query_error)
    }
}
