//! In-memory implementation of the CorrelationStore trait.
//!
//! Same semantics as SQLite, no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use docseal_core::{CorrelationRecord, SubmissionId};

use crate::error::{Result, StoreError};
use crate::traits::CorrelationStore;

/// In-memory store. All data is lost when the store is dropped.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    records: HashMap<SubmissionId, CorrelationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Internal(format!("lock poisoned: {}", e))
}

#[async_trait]
impl CorrelationStore for MemoryStore {
    async fn put(&self, record: &CorrelationRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.records.contains_key(&record.submission_id) {
            return Err(StoreError::DuplicateCorrelation(record.submission_id.clone()));
        }

        inner
            .records
            .insert(record.submission_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, submission_id: &SubmissionId) -> Result<Option<CorrelationRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.records.get(submission_id).cloned())
    }

    async fn list(&self) -> Result<Vec<CorrelationRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut records: Vec<CorrelationRecord> = inner.records.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.submission_id.cmp(&b.submission_id))
        });
        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.records.len())
    }
}
