//! SQLite implementation of the CorrelationStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use docseal_core::{ContentId, CorrelationRecord, SubmissionId, TransactionId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::CorrelationStore;

/// SQLite-based correlation store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        // Full sync so a returned put survives a crash.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        migration::migrate(&mut conn)?;

        tracing::debug!(path = %path.display(), "opened correlation store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Internal(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("spawn_blocking failed: {}", e)))?
    }
}

const SELECT_COLUMNS: &str =
    "submission_id, content_id, transaction_id, owner, claim_id, created_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CorrelationRecord> {
    Ok(CorrelationRecord {
        submission_id: SubmissionId::new(row.get::<_, String>("submission_id")?),
        content_id: ContentId::new(row.get::<_, String>("content_id")?),
        transaction_id: TransactionId::new(row.get::<_, String>("transaction_id")?),
        owner: row.get("owner")?,
        claim_id: row.get("claim_id")?,
        created_at: row.get("created_at")?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl CorrelationStore for SqliteStore {
    async fn put(&self, record: &CorrelationRecord) -> Result<()> {
        let record = record.clone();

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO correlations (
                    submission_id, content_id, transaction_id, owner, claim_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.submission_id.as_str(),
                    record.content_id.as_str(),
                    record.transaction_id.as_str(),
                    record.owner,
                    record.claim_id,
                    record.created_at,
                ],
            );

            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_constraint_violation(&e) => {
                    Err(StoreError::DuplicateCorrelation(record.submission_id))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get(&self, submission_id: &SubmissionId) -> Result<Option<CorrelationRecord>> {
        let id = submission_id.clone();

        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM correlations WHERE submission_id = ?1",
                    SELECT_COLUMNS
                ),
                params![id.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<CorrelationRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM correlations ORDER BY created_at ASC, submission_id ASC",
                SELECT_COLUMNS
            ))?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM correlations", [], |row| row.get(0))?;
            usize::try_from(n).map_err(|_| StoreError::InvalidData(format!("negative count {}", n)))
        })
        .await
    }
}
