//! # Docseal
//!
//! Attests documents by recording their content identifier on an
//! append-only ledger, and later verifies them by replaying the ledger
//! record against the original content.
//!
//! ## Overview
//!
//! - **Attestation**: canonicalize a submission, store it in a content
//!   store, submit a ledger call carrying the content id, and durably
//!   correlate submission, content and transaction.
//! - **Verification**: fetch a transaction, decode its call data, compare
//!   the attested content id with the expected one, fetch the content, and
//!   classify the result.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use docseal::{Gateways, Kernel, OrchestratorConfig};
//! use docseal::core::Submission;
//! use docseal::gateway::{LogSink, MemoryContentStore, MemoryLedger, SignerContext};
//! use docseal::store::SqliteStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OrchestratorConfig {
//!         signer: SignerContext::new("0x00a329c0648769a73afac7f9381e08fb43dbea72"),
//!         ..Default::default()
//!     };
//!     let gateways = Gateways {
//!         content: Arc::new(MemoryContentStore::new()),
//!         ledger: Arc::new(MemoryLedger::new()),
//!         sink: Arc::new(LogSink),
//!     };
//!     let kernel = Kernel::new(config, Arc::new(SqliteStore::open("docseal.db")?), gateways)?;
//!
//!     let submission = Submission::from_json(br#"{"name":"S1","owner":"alice"}"#)?;
//!     let result = kernel.attest(&submission).await?;
//!     println!("{}", result.record().transaction_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docseal::core` - Submissions, canonicalization, call-data codec
//! - `docseal::store` - Correlation store
//! - `docseal::gateway` - Content store, ledger and reporting gateways

pub mod attestation;
pub mod config;
pub mod error;
pub mod intake;
pub mod kernel;
pub mod locks;
pub mod verification;

pub use docseal_core as core;
pub use docseal_gateway as gateway;
pub use docseal_store as store;

pub use attestation::{AttestResult, AttestationOrchestrator};
pub use config::OrchestratorConfig;
pub use error::{KernelError, Result};
pub use intake::{Dispatcher, IntakeEvent, IntakeOutcome};
pub use kernel::{Gateways, Kernel};
pub use locks::{IdentityGuard, IdentityLocks};
pub use verification::{VerificationOrchestrator, VerificationOutcome, VerificationRequest};

pub use docseal_core::{ContentId, CorrelationRecord, Submission, SubmissionId, TransactionId};
