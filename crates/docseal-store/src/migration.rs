//! Database schema migrations for SQLite.
//!
//! Versioned: each migration transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema. Idempotent.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "migrated correlation schema");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: correlation records.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE correlations (
            submission_id TEXT PRIMARY KEY,   -- identity field of the submission
            content_id TEXT NOT NULL,         -- content store identifier
            transaction_id TEXT NOT NULL,     -- ledger transaction identifier
            owner TEXT,
            claim_id TEXT,
            created_at INTEGER NOT NULL       -- Unix ms
        );

        CREATE INDEX idx_correlations_content ON correlations(content_id);
        CREATE INDEX idx_correlations_transaction ON correlations(transaction_id);
        CREATE INDEX idx_correlations_created ON correlations(created_at, submission_id);

        -- Records are append-only.
        CREATE TRIGGER correlations_no_update BEFORE UPDATE ON correlations
        BEGIN
            SELECT RAISE(ABORT, 'correlation records are append-only');
        END;

        CREATE TRIGGER correlations_no_delete BEFORE DELETE ON correlations
        BEGIN
            SELECT RAISE(ABORT, 'correlation records are append-only');
        END;
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
