//! End-to-end attestation and verification over in-memory gateways.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use docseal::core::{
    encode_call, CorrelationRecord, FunctionSignature, SubmissionId, Token, TransactionId,
};
use docseal::gateway::{AttestationStatus, ContentStore, Ledger, SignerContext};
use docseal::store::{CorrelationStore, MemoryStore, SqliteStore, StoreError};
use docseal::{
    AttestResult, IntakeEvent, IntakeOutcome, OrchestratorConfig, VerificationOutcome,
    VerificationRequest,
};
use docseal_testkit::fixtures::{sample_submission, test_config, TestHarness, SIGNER_ACCOUNT};

fn request(record: &CorrelationRecord) -> VerificationRequest {
    VerificationRequest {
        expected_content_id: record.content_id.clone(),
        transaction_id: record.transaction_id.clone(),
        requester: "registrar".into(),
        subject: "alice".into(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attestation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_attest_records_correlation() {
    let h = TestHarness::new();
    let result = h
        .kernel
        .attest(&sample_submission("S1", "alice", Some("C1")))
        .await
        .unwrap();

    let record = result.record().clone();
    assert!(result.is_new());
    assert_eq!(record.submission_id, SubmissionId::new("S1"));
    assert_eq!(record.owner.as_deref(), Some("alice"));
    assert_eq!(record.claim_id.as_deref(), Some("C1"));

    let stored = h.kernel.record(&SubmissionId::new("S1")).await.unwrap();
    assert_eq!(stored, Some(record.clone()));

    // The stored payload carries the document but not its metadata.
    let payload = h.content.get(&record.content_id).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(value["name"], "S1");
    assert!(value.get("owner").is_none());
    assert!(value.get("citizenship_no").is_none());

    let reports = h.sink.attestations();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, AttestationStatus::Attested);
    assert_eq!(reports[0].transaction_id.as_ref(), Some(&record.transaction_id));
}

#[tokio::test]
async fn test_reattest_returns_existing_record() {
    let h = TestHarness::new();
    let first = h
        .kernel
        .attest(&sample_submission("S1", "alice", Some("C1")))
        .await
        .unwrap();
    let second = h
        .kernel
        .attest(&sample_submission("S1", "alice", Some("C1")))
        .await
        .unwrap();

    assert!(matches!(second, AttestResult::AlreadyAttested(_)));
    assert_eq!(first.record(), second.record());
    assert_eq!(h.ledger.transaction_count(), 1);
    assert_eq!(h.sink.attestations()[1].status, AttestationStatus::AlreadyAttested);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attestation_writes_once() {
    let h = TestHarness::new();
    let events: Vec<IntakeEvent> = (0..8)
        .map(|_| IntakeEvent::Attest(sample_submission("S1", "alice", None)))
        .collect();

    let outcomes = h.kernel.dispatch(events).await;

    let mut new = 0;
    let mut existing = 0;
    let mut transaction: Option<TransactionId> = None;
    for outcome in outcomes {
        match outcome {
            IntakeOutcome::Attestation(Ok(result)) => {
                if result.is_new() {
                    new += 1;
                } else {
                    existing += 1;
                }
                let tx = result.record().transaction_id.clone();
                assert_eq!(*transaction.get_or_insert_with(|| tx.clone()), tx);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
    assert_eq!((new, existing), (1, 7));
    assert_eq!(h.ledger.transaction_count(), 1);
    assert_eq!(h.kernel.record_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_distinct_submissions_attest_independently() {
    let h = TestHarness::new();
    let events = ["S1", "S2", "S3"]
        .iter()
        .map(|name| IntakeEvent::Attest(sample_submission(name, "alice", None)));

    let outcomes = h.kernel.dispatch(events).await;
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, IntakeOutcome::Attestation(Ok(r)) if r.is_new())));
    assert_eq!(h.ledger.transaction_count(), 3);

    let ids: Vec<String> = h
        .kernel
        .records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.submission_id.into_string())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids.len(), 3);
    assert_eq!(sorted, vec!["S1", "S2", "S3"]);
}

/// Delegates reads, refuses every write.
struct RefusingStore {
    inner: MemoryStore,
}

#[async_trait]
impl CorrelationStore for RefusingStore {
    async fn put(&self, _record: &CorrelationRecord) -> docseal::store::Result<()> {
        Err(StoreError::Internal("disk full".into()))
    }

    async fn get(&self, id: &SubmissionId) -> docseal::store::Result<Option<CorrelationRecord>> {
        self.inner.get(id).await
    }

    async fn list(&self) -> docseal::store::Result<Vec<CorrelationRecord>> {
        self.inner.list().await
    }

    async fn count(&self) -> docseal::store::Result<usize> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn test_unrecorded_correlation_surfaces_both_ids() {
    let h = TestHarness::with_store(Arc::new(RefusingStore {
        inner: MemoryStore::new(),
    }));

    let err = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CorrelationNotRecorded");
    assert_eq!(h.ledger.transaction_count(), 1);

    let report = &h.sink.attestations()[0];
    assert_eq!(report.status, AttestationStatus::Failed);
    assert!(report.transaction_id.is_some());
    assert!(report.content_id.is_some());
    assert_eq!(report.error.as_ref().unwrap().code, "CorrelationNotRecorded");
}

#[tokio::test]
async fn test_sqlite_correlation_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("correlations.db");

    let first = {
        let h = TestHarness::with_store(Arc::new(SqliteStore::open(&path).unwrap()));
        h.kernel
            .attest(&sample_submission("S1", "alice", Some("C1")))
            .await
            .unwrap()
            .into_record()
    };

    let h = TestHarness::with_store(Arc::new(SqliteStore::open(&path).unwrap()));
    let again = h
        .kernel
        .attest(&sample_submission("S1", "alice", Some("C1")))
        .await
        .unwrap();

    assert!(!again.is_new());
    assert_eq!(again.record(), &first);
    assert_eq!(h.ledger.transaction_count(), 0);
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let config = OrchestratorConfig {
        attest_function: FunctionSignature::parse("addDocument(uint256)").unwrap(),
        ..test_config()
    };
    let store: Arc<dyn CorrelationStore> = Arc::new(MemoryStore::new());
    let gateways = docseal::Gateways {
        content: Arc::new(docseal::gateway::MemoryContentStore::new()),
        ledger: Arc::new(docseal::gateway::MemoryLedger::new()),
        sink: Arc::new(docseal::gateway::LogSink),
    };
    let err = docseal::Kernel::new(config, store, gateways).err().unwrap();
    assert_eq!(err.code(), "InvalidConfiguration");
}

// ─────────────────────────────────────────────────────────────────────────────
// Verification
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_attested_document() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", Some("C1")))
        .await
        .unwrap()
        .into_record();

    let outcome = h.kernel.verify(&request(&record)).await;
    assert!(outcome.is_verified(), "{:?}", outcome);
    assert_eq!(outcome.payload().unwrap()["name"], "S1");
    assert_eq!(h.kernel.verify(&request(&record)).await, outcome);

    let report = &h.sink.verifications()[0];
    assert!(report.verified);
    assert_eq!(report.outcome, "Verified");
    assert_eq!(report.requester, "registrar");
    assert_eq!(report.subject, "alice");
}

#[tokio::test]
async fn test_verify_unknown_transaction() {
    let h = TestHarness::new();
    let req = VerificationRequest {
        expected_content_id: docseal::ContentId::new(
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
        ),
        transaction_id: TransactionId::new("0xdeadbeef"),
        requester: "registrar".into(),
        subject: "bob".into(),
    };

    let outcome = h.kernel.verify(&req).await;
    assert!(matches!(outcome, VerificationOutcome::TransactionNotFound { .. }));

    let report = &h.sink.verifications()[0];
    assert!(!report.verified);
    assert_eq!(report.outcome, "TransactionNotFound");
    assert_eq!(report.subject, "bob");
}

#[tokio::test]
async fn test_verify_mismatch_skips_content_fetch() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap()
        .into_record();

    let mut req = request(&record);
    req.expected_content_id = docseal::ContentId::new("QmSomethingElse");
    let fetches = h.content.get_count();

    let outcome = h.kernel.verify(&req).await;
    assert_eq!(
        outcome,
        VerificationOutcome::ContentMismatch {
            decoded: record.content_id.clone()
        }
    );
    assert_eq!(h.content.get_count(), fetches);
}

#[tokio::test]
async fn test_verify_content_outage() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap()
        .into_record();

    h.content.set_available(false);
    let outcome = h.kernel.verify(&request(&record)).await;
    assert!(matches!(outcome, VerificationOutcome::ContentFetchError { .. }));
    assert_eq!(outcome.decoded_content_id(), Some(&record.content_id));
}

#[tokio::test]
async fn test_verify_foreign_call_is_decode_error() {
    let h = TestHarness::with_config(OrchestratorConfig {
        signatures: vec![FunctionSignature::parse("transfer(address,uint256)").unwrap()],
        ..test_config()
    });

    let transfer = FunctionSignature::parse("transfer(address,uint256)").unwrap();
    let call = encode_call(
        &transfer,
        &[Token::Address([0x11; 20]), Token::zero(&transfer.inputs()[1])],
    )
    .unwrap();
    let tx = h.ledger.submit(call, &SignerContext::new(SIGNER_ACCOUNT)).await.unwrap();

    let unknown = h
        .ledger
        .submit(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]), &SignerContext::new(SIGNER_ACCOUNT))
        .await
        .unwrap();

    for transaction_id in [tx, unknown] {
        let outcome = h
            .kernel
            .verify(&VerificationRequest {
                expected_content_id: docseal::ContentId::new("Qm"),
                transaction_id,
                requester: String::new(),
                subject: String::new(),
            })
            .await;
        assert!(matches!(outcome, VerificationOutcome::DecodeError { .. }), "{:?}", outcome);
    }
}

#[tokio::test]
async fn test_verification_request_from_intake_json() {
    let req: VerificationRequest = serde_json::from_value(json!({
        "ipfs_hash": "QmA",
        "blockchain_hash": "0x01",
        "requested_by": "registrar",
        "user": "alice"
    }))
    .unwrap();
    assert_eq!(req.expected_content_id.as_str(), "QmA");
    assert_eq!(req.subject, "alice");
}

// ─────────────────────────────────────────────────────────────────────────────
// Inspection
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_transaction() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap()
        .into_record();

    let (tx, call) = h.kernel.inspect_transaction(&record.transaction_id).await.unwrap();
    assert_eq!(tx.from, SIGNER_ACCOUNT);
    assert_eq!(call.name(), "addDocument");
    assert_eq!(call.string_arg(0), Some(record.content_id.as_str()));

    let err = h
        .kernel
        .inspect_transaction(&TransactionId::new("0x00"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TransactionNotFound");
}

#[tokio::test]
async fn test_dispatch_preserves_event_order() {
    let h = TestHarness::new();
    let record = h
        .kernel
        .attest(&sample_submission("S1", "alice", None))
        .await
        .unwrap()
        .into_record();

    let outcomes = h
        .kernel
        .dispatch(vec![
            IntakeEvent::Verify(request(&record)),
            IntakeEvent::Attest(sample_submission("S2", "bob", None)),
            IntakeEvent::Attest(
                docseal::Submission::from_value(json!({"owner": "carol"})).unwrap(),
            ),
        ])
        .await;

    assert!(matches!(&outcomes[0], IntakeOutcome::Verification(o) if o.is_verified()));
    assert!(matches!(&outcomes[1], IntakeOutcome::Attestation(Ok(r)) if r.is_new()));
    assert!(matches!(
        &outcomes[2],
        IntakeOutcome::Attestation(Err(e)) if e.code() == "MalformedSubmission"
    ));
}

#[tokio::test]
async fn test_handle_single_event() {
    let h = TestHarness::new();

    let first = h
        .kernel
        .handle(IntakeEvent::Attest(sample_submission("S1", "alice", None)))
        .await;
    let record = match first {
        IntakeOutcome::Attestation(Ok(result)) => {
            assert!(result.is_new());
            result.into_record()
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    let again = h
        .kernel
        .handle(IntakeEvent::Attest(sample_submission("S1", "alice", None)))
        .await;
    assert!(matches!(again, IntakeOutcome::Attestation(Ok(r)) if !r.is_new()));

    let verified = h.kernel.handle(IntakeEvent::Verify(request(&record))).await;
    assert!(matches!(verified, IntakeOutcome::Verification(o) if o.is_verified()));
    assert_eq!(h.ledger.transaction_count(), 1);
}
