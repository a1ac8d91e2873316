//! # Docseal Core
//!
//! Pure primitives for Docseal: submissions, canonicalization, the call-data
//! codec, and correlation records.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Submission`] - A raw intake record
//! - [`Canonicalizer`] - Reduces a submission to deterministic attestable bytes
//! - [`SignatureCatalog`] - Known function signatures, for decoding call data
//! - [`CorrelationRecord`] - Links a submission to its content and ledger ids
//!
//! ## Canonicalization
//!
//! Payloads are sorted-key JSON or deterministic CBOR. See [`canonical`].

pub mod canonical;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod record;
pub mod submission;
pub mod types;

pub use canonical::{CanonicalPayload, Canonicalizer, PayloadFormat};
pub use codec::{
    decode_call, encode_call, DecodedCall, FunctionSignature, ParamType, Selector,
    SignatureCatalog, Token, Word,
};
pub use crypto::{keccak256, Blake3Hash};
pub use error::{CanonicalError, CodecError};
pub use record::CorrelationRecord;
pub use submission::Submission;
pub use types::{ContentId, SubmissionId, TransactionId};
