//! Correlation records: the durable link between a submission, its content
//! identifier and the ledger transaction that attested it.

use serde::{Deserialize, Serialize};

use crate::types::{ContentId, SubmissionId, TransactionId};

/// Written once per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub submission_id: SubmissionId,
    pub content_id: ContentId,
    pub transaction_id: TransactionId,
    pub owner: Option<String>,
    /// Claim identifier carried for correlation only (e.g. a citizenship number).
    pub claim_id: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl CorrelationRecord {
    pub fn new(
        submission_id: SubmissionId,
        content_id: ContentId,
        transaction_id: TransactionId,
        created_at: i64,
    ) -> Self {
        Self {
            submission_id,
            content_id,
            transaction_id,
            owner: None,
            claim_id: None,
            created_at,
        }
    }

    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_claim(mut self, claim_id: Option<String>) -> Self {
        self.claim_id = claim_id;
        self
    }
}
