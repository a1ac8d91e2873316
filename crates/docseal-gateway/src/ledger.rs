//! Ledger gateway.
//!
//! The ledger is append-only: `submit(callData, signer) -> TransactionId`,
//! `get(TransactionId) -> TransactionRecord`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use docseal_core::TransactionId;

use crate::error::Result;

/// Base cost of any transaction.
pub const TX_BASE_GAS: u64 = 21_000;
/// Cost per zero byte of call data.
pub const TX_DATA_ZERO_GAS: u64 = 4;
/// Cost per non-zero byte of call data.
pub const TX_DATA_NONZERO_GAS: u64 = 16;

/// Minimum gas a transaction carrying `call_data` must be budgeted.
pub fn intrinsic_gas(call_data: &[u8]) -> u64 {
    call_data.iter().fold(TX_BASE_GAS, |gas, &b| {
        gas + if b == 0 {
            TX_DATA_ZERO_GAS
        } else {
            TX_DATA_NONZERO_GAS
        }
    })
}

/// Block a transaction was included in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub number: u64,
    pub hash: String,
}

/// A transaction as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    /// Sending account.
    pub from: String,
    pub call_data: Bytes,
    /// `None` while pending.
    pub block: Option<BlockRef>,
}

/// Caller-supplied limits for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBudget {
    pub gas_limit: u64,
    /// Wei per gas. `None` asks the ledger for its current price.
    pub gas_price: Option<u128>,
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self {
            gas_limit: 3_000_000,
            gas_price: None,
        }
    }
}

/// Who sends a transaction and what it may spend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerContext {
    pub account: String,
    pub budget: ResourceBudget,
}

impl SignerContext {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            budget: ResourceBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: ResourceBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// Append-only transaction ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Submit a contract call. The ledger signs with `signer.account`.
    async fn submit(&self, call_data: Bytes, signer: &SignerContext) -> Result<TransactionId>;

    /// Look up a transaction.
    ///
    /// Fails with [`GatewayError::NotFound`](crate::GatewayError::NotFound)
    /// for unknown transactions.
    async fn get(&self, id: &TransactionId) -> Result<TransactionRecord>;
}

/// In-memory ledger for tests and dry runs.
///
/// Every accepted transaction is mined immediately into its own block.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::RwLock;

    use docseal_core::Blake3Hash;

    use crate::error::GatewayError;

    const TX_DOMAIN: &str = "docseal 2024 memory ledger transaction";
    const BLOCK_DOMAIN: &str = "docseal 2024 memory ledger block";

    #[derive(Default)]
    struct Inner {
        transactions: HashMap<TransactionId, TransactionRecord>,
        height: u64,
    }

    pub struct MemoryLedger {
        inner: RwLock<Inner>,
        available: AtomicBool,
    }

    impl MemoryLedger {
        pub fn new() -> Self {
            Self {
                inner: RwLock::new(Inner::default()),
                available: AtomicBool::new(true),
            }
        }

        /// Simulate an outage for both submit and get.
        pub fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        /// Number of accepted transactions.
        pub fn transaction_count(&self) -> usize {
            self.inner.read().map(|i| i.transactions.len()).unwrap_or(0)
        }

        pub fn height(&self) -> u64 {
            self.inner.read().map(|i| i.height).unwrap_or(0)
        }

        fn check_available(&self) -> Result<()> {
            if self.available.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(GatewayError::Unavailable("ledger offline".into()))
            }
        }
    }

    impl Default for MemoryLedger {
        fn default() -> Self {
            Self::new()
        }
    }

    fn poisoned<T>(e: std::sync::PoisonError<T>) -> GatewayError {
        GatewayError::Unavailable(format!("lock poisoned: {}", e))
    }

    #[async_trait]
    impl Ledger for MemoryLedger {
        async fn submit(&self, call_data: Bytes, signer: &SignerContext) -> Result<TransactionId> {
            self.check_available()?;

            if signer.account.is_empty() {
                return Err(GatewayError::Rejected("no sending account".into()));
            }
            let needed = intrinsic_gas(&call_data);
            if signer.budget.gas_limit < needed {
                return Err(GatewayError::Rejected(format!(
                    "intrinsic gas too low: have {}, want {}",
                    signer.budget.gas_limit, needed
                )));
            }

            let mut inner = self.inner.write().map_err(poisoned)?;
            let number = inner.height + 1;
            let nonce = number.to_be_bytes();

            let tx_hash = Blake3Hash::hash_domain(
                TX_DOMAIN,
                &[signer.account.as_bytes(), &nonce[..], call_data.as_ref()],
            );
            let block_hash =
                Blake3Hash::hash_domain(BLOCK_DOMAIN, &[&nonce[..], &tx_hash.as_bytes()[..]]);
            let id = TransactionId::new(format!("0x{}", tx_hash.to_hex()));

            inner.transactions.insert(
                id.clone(),
                TransactionRecord {
                    transaction_id: id.clone(),
                    from: signer.account.clone(),
                    call_data,
                    block: Some(BlockRef {
                        number,
                        hash: format!("0x{}", block_hash.to_hex()),
                    }),
                },
            );
            inner.height = number;

            tracing::debug!(transaction_id = %id, block = number, "mined transaction");
            Ok(id)
        }

        async fn get(&self, id: &TransactionId) -> Result<TransactionRecord> {
            self.check_available()?;
            let inner = self.inner.read().map_err(poisoned)?;
            inner
                .transactions
                .get(id)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("transaction {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryLedger;
    use super::*;
    use crate::error::GatewayError;

    fn signer() -> SignerContext {
        SignerContext::new("0x00a329c0648769a73afac7f9381e08fb43dbea72")
    }

    #[test]
    fn test_intrinsic_gas() {
        assert_eq!(intrinsic_gas(&[]), 21_000);
        assert_eq!(intrinsic_gas(&[0, 0, 1]), 21_000 + 4 + 4 + 16);
    }

    #[tokio::test]
    async fn test_submit_and_get() {
        let ledger = MemoryLedger::new();
        let data = Bytes::from_static(&[0xf7, 0x40, 0xe0, 0x45]);
        let id = ledger.submit(data.clone(), &signer()).await.unwrap();

        let record = ledger.get(&id).await.unwrap();
        assert_eq!(record.transaction_id, id);
        assert_eq!(record.call_data, data);
        assert_eq!(record.from, signer().account);
        assert_eq!(record.block.unwrap().number, 1);
        assert!(id.as_str().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_each_submit_is_a_new_transaction() {
        let ledger = MemoryLedger::new();
        let data = Bytes::from_static(b"same");
        let a = ledger.submit(data.clone(), &signer()).await.unwrap();
        let b = ledger.submit(data, &signer()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.transaction_count(), 2);
        assert_eq!(ledger.height(), 2);
    }

    #[tokio::test]
    async fn test_budget_below_intrinsic_cost() {
        let ledger = MemoryLedger::new();
        let poor = signer().with_budget(ResourceBudget {
            gas_limit: 21_000,
            gas_price: None,
        });
        let err = ledger.submit(Bytes::from_static(&[1]), &poor).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_sender() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .submit(Bytes::new(), &SignerContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let ledger = MemoryLedger::new();
        let err = ledger.get(&TransactionId::new("0xdead")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_budget_defaults() {
        let budget: ResourceBudget = serde_json::from_str("{}").unwrap();
        assert_eq!(budget.gas_limit, 3_000_000);
        assert_eq!(budget.gas_price, None);
    }
}
