//! Attestation: submission → canonical payload → content store → ledger →
//! correlation record → report.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, warn};

use docseal_core::{
    encode_call, Canonicalizer, ContentId, CorrelationRecord, FunctionSignature, Submission,
    SubmissionId, Token,
};
use docseal_gateway::{
    AttestationReport, AttestationStatus, ContentStore, Ledger, Report, ReportError, ReportSink,
    SignerContext,
};
use docseal_store::CorrelationStore;

use crate::config::OrchestratorConfig;
use crate::error::{KernelError, Result};
use crate::locks::IdentityLocks;

/// Result of attesting a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestResult {
    /// Newly attested: one ledger write happened.
    Attested(CorrelationRecord),
    /// Attested before; the existing record is returned and nothing was written.
    AlreadyAttested(CorrelationRecord),
}

impl AttestResult {
    pub fn record(&self) -> &CorrelationRecord {
        match self {
            AttestResult::Attested(r) | AttestResult::AlreadyAttested(r) => r,
        }
    }

    pub fn into_record(self) -> CorrelationRecord {
        match self {
            AttestResult::Attested(r) | AttestResult::AlreadyAttested(r) => r,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, AttestResult::Attested(_))
    }
}

pub struct AttestationOrchestrator {
    canonicalizer: Canonicalizer,
    attest_function: FunctionSignature,
    content_param: usize,
    signer: SignerContext,
    content: Arc<dyn ContentStore>,
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn CorrelationStore>,
    sink: Arc<dyn ReportSink>,
    locks: IdentityLocks,
}

impl AttestationOrchestrator {
    pub fn new(
        config: &OrchestratorConfig,
        content: Arc<dyn ContentStore>,
        ledger: Arc<dyn Ledger>,
        store: Arc<dyn CorrelationStore>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            canonicalizer: config.canonicalizer.clone(),
            attest_function: config.attest_function.clone(),
            content_param: config.content_param,
            signer: config.signer.clone(),
            content,
            ledger,
            store,
            sink,
            locks: IdentityLocks::new(),
        })
    }

    /// Lock table, exposed for inspection.
    pub fn locks(&self) -> &IdentityLocks {
        &self.locks
    }

    /// Attest a submission. Idempotent per submission identity.
    ///
    /// Every outcome, success or failure, is forwarded to the report sink.
    pub async fn attest(&self, submission: &Submission) -> Result<AttestResult> {
        let id = match self.canonicalizer.identity(submission) {
            Ok(id) => id,
            Err(e) => {
                let err = KernelError::from(e);
                warn!(error = %err, "rejected submission without identity");
                self.report(failure_report(None, &err)).await;
                return Err(err);
            }
        };

        let _guard = self.locks.acquire(&id).await;

        match self.attest_exclusive(&id, submission).await {
            Ok(result) => {
                self.report(success_report(&result)).await;
                Ok(result)
            }
            Err(err) => {
                warn!(submission = %id, code = err.code(), error = %err, "attestation failed");
                self.report(failure_report(Some(&id), &err)).await;
                Err(err)
            }
        }
    }

    /// Runs with the identity lock held.
    async fn attest_exclusive(
        &self,
        id: &SubmissionId,
        submission: &Submission,
    ) -> Result<AttestResult> {
        let payload = self.canonicalizer.canonicalize(submission)?;
        let owner = self.canonicalizer.owner(submission)?;
        let claim = self.canonicalizer.claim(submission)?;

        if let Some(existing) = self.store.get(id).await? {
            info!(
                submission = %id,
                transaction_id = %existing.transaction_id,
                "already attested"
            );
            return Ok(AttestResult::AlreadyAttested(existing));
        }

        let content_id = self
            .content
            .put(payload.into_bytes())
            .await
            .map_err(KernelError::StoreUnavailable)?;

        let call_data = self.encode_attest_call(&content_id)?;
        let transaction_id = self
            .ledger
            .submit(call_data, &self.signer)
            .await
            .map_err(KernelError::LedgerUnavailable)?;

        let record = CorrelationRecord::new(id.clone(), content_id, transaction_id, now_millis())
            .with_owner(owner)
            .with_claim(claim);

        if let Err(source) = self.store.put(&record).await {
            error!(
                submission = %id,
                transaction_id = %record.transaction_id,
                content_id = %record.content_id,
                error = %source,
                "ledger write succeeded but correlation was not recorded"
            );
            return Err(KernelError::CorrelationNotRecorded {
                transaction_id: record.transaction_id,
                content_id: record.content_id,
                source,
            });
        }

        info!(
            submission = %id,
            content_id = %record.content_id,
            transaction_id = %record.transaction_id,
            "attested"
        );
        Ok(AttestResult::Attested(record))
    }

    fn encode_attest_call(&self, content_id: &ContentId) -> Result<Bytes> {
        let args: Vec<Token> = self
            .attest_function
            .inputs()
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                if i == self.content_param {
                    Token::String(content_id.as_str().to_string())
                } else {
                    Token::zero(ty)
                }
            })
            .collect();
        Ok(encode_call(&self.attest_function, &args)?)
    }

    async fn report(&self, report: AttestationReport) {
        if let Err(e) = self.sink.send(&Report::Attestation(report)).await {
            warn!(error = %e, "failed to deliver attestation report");
        }
    }
}

fn success_report(result: &AttestResult) -> AttestationReport {
    let record = result.record();
    AttestationReport {
        submission_id: Some(record.submission_id.clone()),
        status: if result.is_new() {
            AttestationStatus::Attested
        } else {
            AttestationStatus::AlreadyAttested
        },
        content_id: Some(record.content_id.clone()),
        transaction_id: Some(record.transaction_id.clone()),
        owner: record.owner.clone(),
        claim_id: record.claim_id.clone(),
        error: None,
    }
}

fn failure_report(id: Option<&SubmissionId>, err: &KernelError) -> AttestationReport {
    let (content_id, transaction_id) = match err {
        KernelError::CorrelationNotRecorded {
            content_id,
            transaction_id,
            ..
        } => (Some(content_id.clone()), Some(transaction_id.clone())),
        _ => (None, None),
    };

    AttestationReport {
        submission_id: id.cloned(),
        status: AttestationStatus::Failed,
        content_id,
        transaction_id,
        owner: None,
        claim_id: None,
        error: Some(ReportError::new(err.code(), err.to_string())),
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::{DecodedCall, SignatureCatalog};
    use docseal_gateway::{MemoryContentStore, MemoryLedger, RecordingSink};
    use docseal_store::MemoryStore;
    use serde_json::json;

    struct Harness {
        content: Arc<MemoryContentStore>,
        ledger: Arc<MemoryLedger>,
        store: Arc<MemoryStore>,
        sink: Arc<RecordingSink>,
        orchestrator: AttestationOrchestrator,
    }

    fn harness(config: OrchestratorConfig) -> Harness {
        let content = Arc::new(MemoryContentStore::new());
        let ledger = Arc::new(MemoryLedger::new());
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::new());
        let orchestrator = AttestationOrchestrator::new(
            &config,
            content.clone(),
            ledger.clone(),
            store.clone(),
            sink.clone(),
        )
        .unwrap();
        Harness {
            content,
            ledger,
            store,
            sink,
            orchestrator,
        }
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            signer: SignerContext::new("0x00a329c0648769a73afac7f9381e08fb43dbea72"),
            ..Default::default()
        }
    }

    fn submission(value: serde_json::Value) -> Submission {
        Submission::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_encodes_content_id_into_call() {
        let h = harness(config());
        let result = h
            .orchestrator
            .attest(&submission(json!({"name": "S1", "owner": "alice"})))
            .await
            .unwrap();

        let tx = h.ledger.get(&result.record().transaction_id).await.unwrap();
        let catalog = SignatureCatalog::parse(["addDocument(string)"]).unwrap();
        let call: DecodedCall = catalog.decode(&tx.call_data).unwrap();
        assert_eq!(call.string_arg(0), Some(result.record().content_id.as_str()));
    }

    #[tokio::test]
    async fn test_extra_parameters_are_zeroed() {
        let h = harness(OrchestratorConfig {
            attest_function: FunctionSignature::parse("register(uint256,string)").unwrap(),
            content_param: 1,
            ..config()
        });
        let result = h
            .orchestrator
            .attest(&submission(json!({"name": "S1"})))
            .await
            .unwrap();

        let tx = h.ledger.get(&result.record().transaction_id).await.unwrap();
        let catalog = SignatureCatalog::parse(["register(uint256,string)"]).unwrap();
        let call = catalog.decode(&tx.call_data).unwrap();
        assert_eq!(call.arg(0), Some(&Token::zero(&docseal_core::ParamType::Uint(256))));
        assert_eq!(call.string_arg(1), Some(result.record().content_id.as_str()));
    }

    #[tokio::test]
    async fn test_missing_identity_is_reported() {
        let h = harness(config());
        let err = h
            .orchestrator
            .attest(&submission(json!({"owner": "alice"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MalformedSubmission");

        let reports = h.sink.attestations();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, AttestationStatus::Failed);
        assert_eq!(reports[0].submission_id, None);
        assert!(h.content.is_empty());
    }

    #[tokio::test]
    async fn test_content_store_outage() {
        let h = harness(config());
        h.content.set_available(false);

        let err = h
            .orchestrator
            .attest(&submission(json!({"name": "S1"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "StoreUnavailable");
        assert_eq!(h.ledger.transaction_count(), 0);
        assert_eq!(h.store.count().await.unwrap(), 0);

        // Redelivery after recovery succeeds.
        h.content.set_available(true);
        let result = h
            .orchestrator
            .attest(&submission(json!({"name": "S1"})))
            .await
            .unwrap();
        assert!(result.is_new());
    }

    #[tokio::test]
    async fn test_ledger_rejection() {
        let mut cfg = config();
        cfg.signer.budget.gas_limit = 21_000;
        let h = harness(cfg);

        let err = h
            .orchestrator
            .attest(&submission(json!({"name": "S1"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "LedgerUnavailable");
        assert_eq!(h.store.count().await.unwrap(), 0);
        assert_eq!(h.sink.attestations()[0].error.as_ref().unwrap().code, "LedgerUnavailable");
    }

    #[tokio::test]
    async fn test_report_failure_does_not_undo_attestation() {
        let h = harness(config());
        h.sink.set_failing(true);

        let result = h
            .orchestrator
            .attest(&submission(json!({"name": "S1"})))
            .await
            .unwrap();
        assert!(result.is_new());
        assert_eq!(h.store.count().await.unwrap(), 1);
        assert!(h.orchestrator.locks().is_empty());
    }
}
