//! Error types for Docseal core.

use thiserror::Error;

/// Errors raised while turning a raw submission into canonical content.
#[derive(Debug, Error)]
pub enum CanonicalError {
    /// The submission is missing required fields or is not a JSON object.
    #[error("malformed submission: {0}")]
    MalformedSubmission(String),

    /// The payload could not be serialized in the requested format.
    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Errors raised by the call-data codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// No catalog entry has this selector.
    #[error("unknown selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    /// Fewer bytes remain than the declared types require.
    #[error("truncated call data: needed {needed} bytes at offset {offset}, {available} available")]
    TruncatedCallData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A word, offset, or length prefix is inconsistent with its type or the remaining bytes.
    #[error("type decode error: {0}")]
    TypeDecodeError(String),

    /// Two catalog entries share a selector.
    #[error("selector 0x{} shared by `{first}` and `{second}`", hex::encode(.selector))]
    AmbiguousSelector {
        selector: [u8; 4],
        first: String,
        second: String,
    },

    /// A signature or type string could not be parsed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// An argument does not match its declared parameter type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Result type for canonicalization.
pub type Result<T> = std::result::Result<T, CanonicalError>;
