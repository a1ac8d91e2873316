//! # Docseal Gateway
//!
//! The external collaborators the orchestrators talk to, behind traits:
//!
//! - [`ContentStore`] - content-addressed blob storage
//! - [`Ledger`] - append-only transaction ledger
//! - [`ReportSink`] - destination for attestation and verification reports
//!
//! Each trait has an in-memory implementation for tests and dry runs
//! ([`MemoryContentStore`], [`MemoryLedger`], [`RecordingSink`]) and an HTTP
//! implementation in [`http`].

pub mod content;
pub mod error;
pub mod http;
pub mod ledger;
pub mod report;

pub use content::memory::MemoryContentStore;
pub use content::ContentStore;
pub use error::{GatewayError, Result};
pub use http::{HttpReportSink, IpfsContentStore, JsonRpcLedger};
pub use ledger::memory::MemoryLedger;
pub use ledger::{intrinsic_gas, BlockRef, Ledger, ResourceBudget, SignerContext, TransactionRecord};
pub use report::{
    AttestationReport, AttestationStatus, LogSink, RecordingSink, Report, ReportError, ReportSink,
    VerificationReport,
};
