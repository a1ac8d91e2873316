//! CorrelationStore trait: the abstract interface for correlation persistence.
//!
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use docseal_core::{CorrelationRecord, SubmissionId};

use crate::error::Result;

/// Async interface for correlation record persistence.
///
/// Records are append-only: at most one per submission, never updated,
/// never deleted. A successful `put` is durable before it returns.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Store a new record.
    ///
    /// Fails with [`StoreError::DuplicateCorrelation`](crate::StoreError::DuplicateCorrelation)
    /// if a record for the same submission already exists; the existing
    /// record is left untouched.
    async fn put(&self, record: &CorrelationRecord) -> Result<()>;

    /// Get the record for a submission.
    async fn get(&self, submission_id: &SubmissionId) -> Result<Option<CorrelationRecord>>;

    /// All records, ordered by creation time then submission id.
    async fn list(&self) -> Result<Vec<CorrelationRecord>>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;
}
