//! Strong type definitions for Docseal.
//!
//! All identifiers are newtypes to prevent misuse at compile time. The
//! content and transaction identifiers are opaque: they are minted by the
//! external content store and ledger and compared byte-for-byte.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the identifier text.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identity of a submission, taken from its identifying field.
    ///
    /// Attestation is idempotent per `SubmissionId`.
    SubmissionId
);

string_id!(
    /// Identifier returned by the content-addressed store for a payload.
    ///
    /// Same bytes produce the same id. Comparison is exact and case-sensitive.
    ContentId
);

string_id!(
    /// Identifier of a ledger transaction (for EVM ledgers, `0x`-prefixed hash).
    TransactionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_is_case_sensitive() {
        let a = ContentId::new("QmAbC");
        let b = ContentId::new("qmabc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_display_and_debug() {
        let id = TransactionId::new("0xabcdef");
        assert_eq!(format!("{}", id), "0xabcdef");
        assert_eq!(format!("{:?}", id), "TransactionId(0xabcdef)");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = SubmissionId::new("S1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"S1\"");
        let back: SubmissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
