//! SQLite store handle and fleet registration.

use std::path::Path;

use rusqlite::params;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;
use tracing::debug;

use fleetwatch_protocols::{RepositoryError, TargetDescriptor};

use crate::schema::init_schema;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// Owner of targets and their notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub slack_webhook: Option<String>,
    #[serde(default)]
    pub discord_webhook: Option<String>,
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default)]
    pub slack_enabled: bool,
    #[serde(default)]
    pub discord_enabled: bool,
}

/// SQLite-backed target and route repositories.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

pub(crate) fn query_error(e: tokio_rusqlite::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl SqliteStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open or create a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepositoryError::Connection(e.to_string()))?;
            }
        }
        debug!(path = %path.display(), "Opening SQLite store");
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, RepositoryError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(query_error)?;
        Ok(Self { conn })
    }

    /// Insert or replace an owner.
    pub async fn upsert_owner(&self, owner: Owner) -> Result<(), RepositoryError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO owners (id, email, slack_webhook, discord_webhook,
                                         email_enabled, slack_enabled, discord_enabled)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                         email = excluded.email,
                         slack_webhook = excluded.slack_webhook,
                         discord_webhook = excluded.discord_webhook,
                         email_enabled = excluded.email_enabled,
                         slack_enabled = excluded.slack_enabled,
                         discord_enabled = excluded.discord_enabled",
                    params![
                        owner.id,
                        owner.email,
                        owner.slack_webhook,
                        owner.discord_webhook,
                        owner.email_enabled,
                        owner.slack_enabled,
                        owner.discord_enabled
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(query_error)
    }

    /// Insert or replace a monitored target.
    pub async fn upsert_target(&self, target: TargetDescriptor) -> Result<(), RepositoryError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO targets (id, name, owner_id, containerized, container_id, address, port, status)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(id) DO UPDATE SET
                         name = excluded.name,
                         owner_id = excluded.owner_id,
                         containerized = excluded.containerized,
                         container_id = excluded.container_id,
                         address = excluded.address,
                         port = excluded.port,
                         status = excluded.status",
                    params![
                        target.id,
                        target.name,
                        target.owner_id,
                        target.containerized,
                        target.container_id,
                        target.address,
                        target.port,
                        target.status
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(query_error)
    }

    /// Include or exclude a target from probe cycles.
    pub async fn set_monitored(&self, target_id: i64, monitored: bool) -> Result<(), RepositoryError> {
        let changed = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "UPDATE targets SET monitored = ?1 WHERE id = ?2",
                    params![monitored, target_id],
                )?)
            })
            .await
            .map_err(query_error)?;

        if changed == 0 {
            return Err(RepositoryError::NotFound(format!("target {}", target_id)));
        }
        Ok(())
    }
}
