//! Reporting sink: where attestation and verification outcomes go.
//!
//! Delivery is fire-and-forget from the orchestrators' point of view; a
//! failed `send` is logged by the caller and never undoes prior work.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use docseal_core::{ContentId, SubmissionId, TransactionId};

use crate::error::{GatewayError, Result};

/// Error code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    pub code: String,
    pub message: String,
}

impl ReportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Attested,
    AlreadyAttested,
    Failed,
}

/// Status of one attestation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationReport {
    /// `None` when the submission had no usable identity.
    pub submission_id: Option<SubmissionId>,
    pub status: AttestationStatus,
    pub content_id: Option<ContentId>,
    pub transaction_id: Option<TransactionId>,
    pub owner: Option<String>,
    pub claim_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
}

/// Classified result of one verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub requester: String,
    pub subject: String,
    pub expected_content_id: ContentId,
    pub transaction_id: TransactionId,
    /// Outcome code, e.g. `Verified` or `ContentMismatch`.
    pub outcome: String,
    pub verified: bool,
    /// Content id recovered from the ledger, once decoding succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_content_id: Option<ContentId>,
    /// The attested document, only when verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Attestation(AttestationReport),
    Verification(VerificationReport),
}

impl From<AttestationReport> for Report {
    fn from(report: AttestationReport) -> Self {
        Report::Attestation(report)
    }
}

impl From<VerificationReport> for Report {
    fn from(report: VerificationReport) -> Self {
        Report::Verification(report)
    }
}

/// Destination for reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn send(&self, report: &Report) -> Result<()>;
}

/// Writes each report to the log as JSON. Used when no sink is configured.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ReportSink for LogSink {
    async fn send(&self, report: &Report) -> Result<()> {
        let json = serde_json::to_string(report)
            .map_err(|e| GatewayError::InvalidResponse(format!("report not serializable: {}", e)))?;
        tracing::info!(report = %json, "report");
        Ok(())
    }
}

/// Keeps every report in memory. For tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<Report>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While failing, reports are dropped and `send` returns an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn attestations(&self) -> Vec<AttestationReport> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Attestation(a) => Some(a),
                Report::Verification(_) => None,
            })
            .collect()
    }

    pub fn verifications(&self) -> Vec<VerificationReport> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Verification(v) => Some(v),
                Report::Attestation(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn send(&self, report: &Report) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("reporting sink offline".into()));
        }
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report.clone());
        Ok(())
    }
}
