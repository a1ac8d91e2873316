//! Error types for the orchestrators.

use docseal_core::{CanonicalError, CodecError, ContentId, TransactionId};
use docseal_gateway::GatewayError;
use docseal_store::StoreError;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The submission could not be canonicalized.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    /// Call data could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The content store failed.
    #[error("content store unavailable: {0}")]
    StoreUnavailable(#[source] GatewayError),

    /// The ledger failed.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[source] GatewayError),

    /// The transaction could not be retrieved from the ledger.
    #[error("transaction {transaction_id} not found: {detail}")]
    TransactionNotFound {
        transaction_id: TransactionId,
        detail: String,
    },

    /// Correlation store error.
    #[error("correlation store error: {0}")]
    Correlation(#[from] StoreError),

    /// The ledger accepted the transaction but the correlation was not persisted.
    #[error("transaction {transaction_id} for content {content_id} was not recorded: {source}")]
    CorrelationNotRecorded {
        transaction_id: TransactionId,
        content_id: ContentId,
        #[source]
        source: StoreError,
    },

    /// A transaction decoded, but not as a call to the attest function.
    #[error("unexpected call: {0}")]
    UnexpectedCall(String),

    /// Invalid orchestrator configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl KernelError {
    /// Stable error code, as forwarded in reports.
    pub fn code(&self) -> &'static str {
        match self {
            KernelError::Canonical(_) => "MalformedSubmission",
            KernelError::Codec(e) => match e {
                CodecError::UnknownSelector(_) => "UnknownSelector",
                CodecError::TruncatedCallData { .. } => "TruncatedCallData",
                CodecError::TypeDecodeError(_) => "TypeDecodeError",
                CodecError::AmbiguousSelector { .. }
                | CodecError::InvalidSignature(_)
                | CodecError::TypeMismatch(_) => "InvalidConfiguration",
            },
            KernelError::StoreUnavailable(_) => "StoreUnavailable",
            KernelError::LedgerUnavailable(_) => "LedgerUnavailable",
            KernelError::TransactionNotFound { .. } => "TransactionNotFound",
            KernelError::Correlation(StoreError::DuplicateCorrelation(_)) => "DuplicateCorrelation",
            KernelError::Correlation(_) => "CorrelationStoreError",
            KernelError::CorrelationNotRecorded { .. } => "CorrelationNotRecorded",
            KernelError::UnexpectedCall(_) => "UnexpectedCall",
            KernelError::InvalidConfiguration(_) => "InvalidConfiguration",
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, KernelError>;
