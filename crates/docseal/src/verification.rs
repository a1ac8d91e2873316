//! Verification: replay a ledger transaction and check it against the
//! content identifier a requester expects.
//!
//! ```text
//! fetch tx ──not found──▶ TransactionNotFound
//!    │
//! decode ──codec error──▶ DecodeError
//!    │
//! compare ──mismatch───▶ ContentMismatch      (no content fetch)
//!    │
//! fetch content ─fail──▶ ContentFetchError
//!    │
//!    ▼
//! Verified(payload)
//! ```
//!
//! Every outcome is terminal and reported. Verification never retries and
//! never returns an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use docseal_core::{ContentId, FunctionSignature, PayloadFormat, SignatureCatalog, TransactionId};
use docseal_gateway::{ContentStore, Ledger, Report, ReportSink, VerificationReport};

use crate::config::OrchestratorConfig;
use crate::error::{KernelError, Result};

/// A request to verify that a transaction attests the expected content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    #[serde(alias = "ipfs_hash")]
    pub expected_content_id: ContentId,
    #[serde(alias = "blockchain_hash")]
    pub transaction_id: TransactionId,
    /// Who asked.
    #[serde(default, alias = "requested_by")]
    pub requester: String,
    /// Whose document.
    #[serde(default, alias = "user")]
    pub subject: String,
}

/// Classified result of a verification.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Verified {
        payload: Value,
    },
    ContentMismatch {
        decoded: ContentId,
    },
    TransactionNotFound {
        detail: String,
    },
    DecodeError {
        detail: String,
    },
    ContentFetchError {
        decoded: ContentId,
        detail: String,
    },
}

impl VerificationOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified { .. } => "Verified",
            VerificationOutcome::ContentMismatch { .. } => "ContentMismatch",
            VerificationOutcome::TransactionNotFound { .. } => "TransactionNotFound",
            VerificationOutcome::DecodeError { .. } => "DecodeError",
            VerificationOutcome::ContentFetchError { .. } => "ContentFetchError",
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified { .. })
    }

    /// The attested document, when verified.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            VerificationOutcome::Verified { payload } => Some(payload),
            _ => None,
        }
    }

    /// Content id recovered from the ledger, once decoding succeeded.
    pub fn decoded_content_id(&self) -> Option<&ContentId> {
        match self {
            VerificationOutcome::ContentMismatch { decoded }
            | VerificationOutcome::ContentFetchError { decoded, .. } => Some(decoded),
            _ => None,
        }
    }

    /// Why the document did not verify.
    pub fn detail(&self) -> Option<&str> {
        match self {
            VerificationOutcome::TransactionNotFound { detail }
            | VerificationOutcome::DecodeError { detail }
            | VerificationOutcome::ContentFetchError { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

pub struct VerificationOrchestrator {
    catalog: SignatureCatalog,
    attest_function: FunctionSignature,
    content_param: usize,
    format: PayloadFormat,
    ledger: Arc<dyn Ledger>,
    content: Arc<dyn ContentStore>,
    sink: Arc<dyn ReportSink>,
}

impl VerificationOrchestrator {
    pub fn new(
        config: &OrchestratorConfig,
        ledger: Arc<dyn Ledger>,
        content: Arc<dyn ContentStore>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: config.catalog()?,
            attest_function: config.attest_function.clone(),
            content_param: config.content_param,
            format: config.canonicalizer.format,
            ledger,
            content,
            sink,
        })
    }

    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }

    /// Verify a request and report the outcome.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        let outcome = self.classify(request).await;

        if outcome.is_verified() {
            info!(
                transaction_id = %request.transaction_id,
                requester = %request.requester,
                subject = %request.subject,
                "verified"
            );
        } else {
            warn!(
                transaction_id = %request.transaction_id,
                requester = %request.requester,
                subject = %request.subject,
                outcome = outcome.code(),
                detail = outcome.detail().unwrap_or(""),
                "verification failed"
            );
        }

        let report = Report::Verification(verification_report(request, &outcome));
        if let Err(e) = self.sink.send(&report).await {
            warn!(error = %e, "failed to deliver verification report");
        }
        outcome
    }

    async fn classify(&self, request: &VerificationRequest) -> VerificationOutcome {
        let record = match self.ledger.get(&request.transaction_id).await {
            Ok(record) => record,
            Err(e) => {
                return VerificationOutcome::TransactionNotFound {
                    detail: e.to_string(),
                }
            }
        };

        let decoded = match self.decode_content_id(&record.call_data) {
            Ok(id) => id,
            Err(e) => {
                return VerificationOutcome::DecodeError {
                    detail: e.to_string(),
                }
            }
        };

        if decoded != request.expected_content_id {
            return VerificationOutcome::ContentMismatch { decoded };
        }

        let bytes = match self.content.get(&decoded).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return VerificationOutcome::ContentFetchError {
                    decoded,
                    detail: e.to_string(),
                }
            }
        };

        match self.format.parse(&bytes) {
            Ok(payload) => VerificationOutcome::Verified { payload },
            Err(e) => VerificationOutcome::ContentFetchError {
                decoded,
                detail: e.to_string(),
            },
        }
    }

    /// Decode call data and pull out the attested content id.
    pub fn decode_content_id(&self, call_data: &[u8]) -> Result<ContentId> {
        let call = self.catalog.decode(call_data)?;

        if call.signature != self.attest_function {
            return Err(KernelError::UnexpectedCall(format!(
                "transaction calls {}, not {}",
                call.signature, self.attest_function
            )));
        }
        let content_id = call.string_arg(self.content_param).ok_or_else(|| {
            KernelError::UnexpectedCall(format!(
                "parameter {} of {} is not a string",
                self.content_param, call.signature
            ))
        })?;
        Ok(ContentId::new(content_id))
    }
}

fn verification_report(
    request: &VerificationRequest,
    outcome: &VerificationOutcome,
) -> VerificationReport {
    VerificationReport {
        requester: request.requester.clone(),
        subject: request.subject.clone(),
        expected_content_id: request.expected_content_id.clone(),
        transaction_id: request.transaction_id.clone(),
        outcome: outcome.code().to_string(),
        verified: outcome.is_verified(),
        decoded_content_id: match outcome {
            VerificationOutcome::Verified { .. } => Some(request.expected_content_id.clone()),
            other => other.decoded_content_id().cloned(),
        },
        payload: outcome.payload().cloned(),
        detail: outcome.detail().map(String::from),
    }
}
