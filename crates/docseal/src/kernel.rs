//! The Kernel: attestation, verification and intake behind one handle.

use std::sync::Arc;

use docseal_core::{
    CorrelationRecord, DecodedCall, SignatureCatalog, Submission, SubmissionId, TransactionId,
};
use docseal_gateway::{ContentStore, Ledger, ReportSink, TransactionRecord};
use docseal_store::CorrelationStore;

use crate::attestation::{AttestResult, AttestationOrchestrator};
use crate::config::OrchestratorConfig;
use crate::error::{KernelError, Result};
use crate::intake::{Dispatcher, IntakeEvent, IntakeOutcome};
use crate::verification::{VerificationOrchestrator, VerificationOutcome, VerificationRequest};

/// The external collaborators, injected at construction.
#[derive(Clone)]
pub struct Gateways {
    pub content: Arc<dyn ContentStore>,
    pub ledger: Arc<dyn Ledger>,
    pub sink: Arc<dyn ReportSink>,
}

pub struct Kernel {
    config: OrchestratorConfig,
    store: Arc<dyn CorrelationStore>,
    ledger: Arc<dyn Ledger>,
    attestation: Arc<AttestationOrchestrator>,
    verification: Arc<VerificationOrchestrator>,
    dispatcher: Dispatcher,
}

impl Kernel {
    /// Validate `config` and wire the orchestrators.
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<dyn CorrelationStore>,
        gateways: Gateways,
    ) -> Result<Self> {
        let attestation = Arc::new(AttestationOrchestrator::new(
            &config,
            Arc::clone(&gateways.content),
            Arc::clone(&gateways.ledger),
            Arc::clone(&store),
            Arc::clone(&gateways.sink),
        )?);
        let verification = Arc::new(VerificationOrchestrator::new(
            &config,
            Arc::clone(&gateways.ledger),
            gateways.content,
            gateways.sink,
        )?);
        let dispatcher = Dispatcher::new(
            Arc::clone(&attestation),
            Arc::clone(&verification),
            config.max_in_flight,
        );

        Ok(Self {
            config,
            store,
            ledger: gateways.ledger,
            attestation,
            verification,
            dispatcher,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SignatureCatalog {
        self.verification.catalog()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Intake
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn attest(&self, submission: &Submission) -> Result<AttestResult> {
        self.attestation.attest(submission).await
    }

    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        self.verification.verify(request).await
    }

    /// Process a single intake event on the calling task.
    pub async fn handle(&self, event: IntakeEvent) -> IntakeOutcome {
        self.dispatcher.handle(event).await
    }

    /// Process a batch of events concurrently; outcomes in event order.
    pub async fn dispatch(
        &self,
        events: impl IntoIterator<Item = IntakeEvent>,
    ) -> Vec<IntakeOutcome> {
        self.dispatcher.dispatch(events).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn record(&self, id: &SubmissionId) -> Result<Option<CorrelationRecord>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn records(&self) -> Result<Vec<CorrelationRecord>> {
        Ok(self.store.list().await?)
    }

    pub async fn record_count(&self) -> Result<usize> {
        Ok(self.store.count().await?)
    }

    /// Fetch a transaction and decode its call data against the catalog.
    pub async fn inspect_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<(TransactionRecord, DecodedCall)> {
        let record = self.ledger.get(id).await.map_err(|e| {
            if e.is_not_found() {
                KernelError::TransactionNotFound {
                    transaction_id: id.clone(),
                    detail: e.to_string(),
                }
            } else {
                KernelError::LedgerUnavailable(e)
            }
        })?;
        let call = self.catalog().decode(&record.call_data)?;
        Ok((record, call))
    }
}
