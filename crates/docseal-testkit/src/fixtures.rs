//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use docseal::{Gateways, Kernel, OrchestratorConfig};
use docseal_core::Submission;
use docseal_gateway::{MemoryContentStore, MemoryLedger, RecordingSink, SignerContext};
use docseal_store::{CorrelationStore, MemoryStore};

/// Ledger account used by fixtures.
pub const SIGNER_ACCOUNT: &str = "0x00a329c0648769a73afac7f9381e08fb43dbea72";

/// A kernel wired to in-memory gateways, with handles to each of them.
pub struct TestHarness {
    pub content: Arc<MemoryContentStore>,
    pub ledger: Arc<MemoryLedger>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<dyn CorrelationStore>,
    pub kernel: Kernel,
}

impl TestHarness {
    /// Default configuration over a memory correlation store.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self::build(config, Arc::new(MemoryStore::new()))
    }

    /// Default configuration over the given correlation store.
    pub fn with_store(store: Arc<dyn CorrelationStore>) -> Self {
        Self::build(test_config(), store)
    }

    pub fn build(config: OrchestratorConfig, store: Arc<dyn CorrelationStore>) -> Self {
        let content = Arc::new(MemoryContentStore::new());
        let ledger = Arc::new(MemoryLedger::new());
        let sink = Arc::new(RecordingSink::new());

        let gateways = Gateways {
            content: content.clone(),
            ledger: ledger.clone(),
            sink: sink.clone(),
        };
        let kernel = Kernel::new(config, Arc::clone(&store), gateways)
            .unwrap_or_else(|e| panic!("invalid test configuration: {}", e));

        Self {
            content,
            ledger,
            sink,
            store,
            kernel,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Default orchestrator configuration with a fixture signer.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        signer: SignerContext::new(SIGNER_ACCOUNT),
        ..Default::default()
    }
}

/// A submission shaped like a document intake record.
pub fn sample_submission(name: &str, owner: &str, claim: Option<&str>) -> Submission {
    let mut fields = Map::new();
    fields.insert("name".into(), json!(name));
    fields.insert("owner".into(), json!(owner));
    fields.insert("document_type".into(), json!("citizenship"));
    fields.insert("issued".into(), json!({"district": "Kathmandu", "year": 2019}));
    if let Some(claim) = claim {
        fields.insert("citizenship_no".into(), Value::String(claim.to_string()));
    }
    Submission::new(fields)
}

/// Distinct submissions for multi-party tests.
pub fn sample_submissions(count: usize) -> Vec<Submission> {
    (0..count)
        .map(|i| sample_submission(&format!("S{}", i + 1), &format!("owner-{}", i), None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_attests() {
        let harness = TestHarness::new();
        let result = harness
            .kernel
            .attest(&sample_submission("S1", "alice", Some("C1")))
            .await
            .unwrap();

        assert!(result.is_new());
        assert_eq!(harness.ledger.transaction_count(), 1);
        assert_eq!(harness.store.count().await.unwrap(), 1);
        assert_eq!(harness.sink.attestations().len(), 1);
    }

    #[test]
    fn test_sample_submissions_are_distinct() {
        let subs = sample_submissions(3);
        assert_ne!(subs[0].get("name"), subs[1].get("name"));
        assert_ne!(subs[1].get("name"), subs[2].get("name"));
    }
}
