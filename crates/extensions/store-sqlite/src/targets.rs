//! Target repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use fleetwatch_protocols::{
    Recipient, RepositoryError, StatusSnapshot, TargetDescriptor, TargetRepository,
};

use crate::store::{query_error, SqliteStore};

#[async_trait]
impl TargetRepository for SqliteStore {
    async fn list_targets_to_check(&self) -> Result<Vec<TargetDescriptor>, RepositoryError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, owner_id, containerized, container_id, address, port, status
                     FROM targets WHERE monitored = 1 ORDER BY id",
                )?;
                let targets = stmt
                    .query_map([], |row| {
                        Ok(TargetDescriptor {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            owner_id: row.get(2)?,
                            containerized: row.get(3)?,
                            container_id: row.get(4)?,
                            address: row.get(5)?,
                            port: row.get(6)?,
                            status: row.get(7)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(targets)
            })
            .await
            .map_err(query_error)
    }

    async fn record_statuses(&self, batch: &[StatusSnapshot]) -> Result<(), RepositoryError> {
        let batch = batch.to_vec();
        let recorded_at = Utc::now();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut insert = tx.prepare(
                        "INSERT INTO status_history (target_id, status, started_at, duration_secs, recorded_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    let mut update = tx.prepare("UPDATE targets SET status = ?1 WHERE id = ?2")?;

                    for snapshot in &batch {
                        insert.execute(params![
                            snapshot.target_id,
                            snapshot.status,
                            snapshot.started_at,
                            snapshot.duration_secs,
                            recorded_at
                        ])?;
                        update.execute(params![snapshot.status, snapshot.target_id])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(query_error)
    }

    async fn resolve_recipients(
        &self,
        statuses: &[StatusSnapshot],
    ) -> Result<Vec<Recipient>, RepositoryError> {
        let statuses: Vec<(i64, String)> = statuses
            .iter()
            .map(|s| (s.target_id, s.status.clone()))
            .collect();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT t.name, o.email_enabled, o.slack_enabled, o.discord_enabled,
                            o.email, o.slack_webhook, o.discord_webhook
                     FROM targets t JOIN owners o ON o.id = t.owner_id
                     WHERE t.id = ?1",
                )?;

                let mut recipients = Vec::with_capacity(statuses.len());
                for (target_id, status) in statuses {
                    let recipient = stmt
                        .query_row([target_id], |row| {
                            Ok(Recipient {
                                target_id,
                                target_name: row.get(0)?,
                                status: status.clone(),
                                email_enabled: row.get(1)?,
                                slack_enabled: row.get(2)?,
                                discord_enabled: row.get(3)?,
                                email: row.get(4)?,
                                slack_webhook: row.get(5)?,
                                discord_webhook: row.get(6)?,
                            })
                        })
                        .optional()?;
                    recipients.extend(recipient);
                }
                Ok(recipients)
            })
            .await
            .map_err(query_error)
    }

    async fn get_status(
        &self,
        target_id: i64,
        owner_id: i64,
    ) -> Result<StatusSnapshot, RepositoryError> {
        let latest = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT h.status, h.started_at, h.duration_secs
                         FROM status_history h JOIN targets t ON t.id = h.target_id
                         WHERE h.target_id = ?1 AND t.owner_id = ?2
                         ORDER BY h.id DESC LIMIT 1",
                        params![target_id, owner_id],
                        |row| {
                            let status: String = row.get(0)?;
                            let started_at: DateTime<Utc> = row.get(1)?;
                            let duration_secs: i64 = row.get(2)?;
                            Ok((status, started_at, duration_secs))
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(query_error)?;

        let (status, started_at, duration_secs) = latest.ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "no status for target {} of owner {}",
                target_id, owner_id
            ))
        })?;

        Ok(StatusSnapshot {
            target_id,
            status,
            started_at,
            duration_secs,
        })
    }
}
