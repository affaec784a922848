//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- Target owners and their notification channels
CREATE TABLE IF NOT EXISTS owners (
    id INTEGER PRIMARY KEY,
    email TEXT,
    slack_webhook TEXT,
    discord_webhook TEXT,
    email_enabled INTEGER NOT NULL DEFAULT 0,
    slack_enabled INTEGER NOT NULL DEFAULT 0,
    discord_enabled INTEGER NOT NULL DEFAULT 0
);

-- Monitored targets
CREATE TABLE IF NOT EXISTS targets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES owners(id),
    containerized INTEGER NOT NULL DEFAULT 0,
    container_id TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    port INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT '',
    monitored INTEGER NOT NULL DEFAULT 1
);

-- Append-only status history
CREATE TABLE IF NOT EXISTS status_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target_id INTEGER NOT NULL REFERENCES targets(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    duration_secs INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

-- Route-chain steps; the request template and expectations live in `definition`
CREATE TABLE IF NOT EXISTS route_steps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id INTEGER NOT NULL REFERENCES targets(id) ON DELETE CASCADE,
    chain_name TEXT NOT NULL,
    position INTEGER NOT NULL,
    parent_id INTEGER NOT NULL DEFAULT 0,
    definition TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'unknown',
    tested_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_targets_monitored ON targets(monitored);
CREATE INDEX IF NOT EXISTS idx_status_history_target ON status_history(target_id, id);
CREATE INDEX IF NOT EXISTS idx_route_steps_chain ON route_steps(app_id, chain_name, position);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        for table in ["owners", "targets", "status_history", "route_steps"] {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")
                .unwrap();
            assert!(stmt.exists([table]).unwrap(), "missing table {}", table);
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
