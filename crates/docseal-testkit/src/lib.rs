//! # Docseal Testkit
//!
//! Testing utilities for Docseal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known selectors, call encodings and canonical
//!   payloads that any compatible implementation must reproduce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A kernel wired to in-memory gateways
//!
//! ## Golden Vectors
//!
//! ```rust
//! use docseal_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, detail) in verify_all_vectors() {
//!     assert!(ok, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docseal_testkit::generators::SubmissionParams;
//!
//! proptest! {
//!     #[test]
//!     fn identity_is_the_name(params: SubmissionParams) {
//!         let submission = params.to_submission();
//!         prop_assert_eq!(submission.get("name").unwrap(), &params.name);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docseal_testkit::fixtures::{sample_submission, TestHarness};
//!
//! let harness = TestHarness::new();
//! let submission = sample_submission("S1", "alice", Some("C1"));
//! assert_eq!(harness.kernel.config().content_param, 0);
//! # let _ = submission;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_submission, test_config, TestHarness, SIGNER_ACCOUNT};
pub use generators::SubmissionParams;
pub use vectors::{
    all_call_vectors, all_canonical_vectors, all_selector_vectors, verify_all_vectors,
};
