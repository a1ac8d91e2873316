//! # Docseal Store
//!
//! Persistence for correlation records: the link from a submission to the
//! content identifier and ledger transaction that attest it.
//!
//! ## Key Types
//!
//! - [`CorrelationStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docseal_store::{CorrelationStore, SqliteStore};
//! use docseal_core::SubmissionId;
//!
//! async fn example() -> docseal_store::Result<()> {
//!     let store = SqliteStore::open("docseal.db")?;
//!     let record = store.get(&SubmissionId::new("alice")).await?;
//!     println!("{:?}", record);
//!     Ok(())
//! }
//! ```
//!
//! Records are append-only: a second `put` for the same submission fails
//! with [`StoreError::DuplicateCorrelation`] and the first record stands.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::CorrelationStore;
