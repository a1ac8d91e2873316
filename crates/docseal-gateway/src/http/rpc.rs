//! Ethereum-style JSON-RPC ledger.
//!
//! Calls go to a fixed contract; the node holds the sender's key and signs
//! (`eth_sendTransaction`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use docseal_core::TransactionId;

use super::{build_client, check_status};
use crate::error::{GatewayError, Result};
use crate::ledger::{BlockRef, Ledger, SignerContext, TransactionRecord};

pub struct JsonRpcLedger {
    client: reqwest::Client,
    url: String,
    contract: String,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    hash: String,
    from: String,
    input: String,
    block_number: Option<String>,
    block_hash: Option<String>,
}

impl JsonRpcLedger {
    /// `contract` is the address every attestation call is sent to.
    pub fn new(
        url: impl Into<String>,
        contract: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            contract: contract.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let response: RpcResponse = check_status(response).await?.json().await?;

        if let Some(error) = response.error {
            return Err(GatewayError::Rejected(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }
        Ok(response.result)
    }

    async fn gas_price(&self) -> Result<u128> {
        let price = self.call("eth_gasPrice", json!([])).await?;
        let price = price
            .as_str()
            .ok_or_else(|| {
                GatewayError::InvalidResponse("eth_gasPrice did not return a string".into())
            })?;
        parse_quantity(price)
    }
}

#[async_trait]
impl Ledger for JsonRpcLedger {
    async fn submit(&self, call_data: Bytes, signer: &SignerContext) -> Result<TransactionId> {
        let gas_price = match signer.budget.gas_price {
            Some(price) => price,
            None => self.gas_price().await?,
        };

        let tx = json!({
            "from": signer.account,
            "to": self.contract,
            "data": format!("0x{}", hex::encode(&call_data)),
            "gas": to_quantity(u128::from(signer.budget.gas_limit)),
            "gasPrice": to_quantity(gas_price),
        });

        let hash = self.call("eth_sendTransaction", json!([tx])).await?;
        let hash = hash.as_str().filter(|h| !h.is_empty()).ok_or_else(|| {
            GatewayError::InvalidResponse("eth_sendTransaction did not return a hash".into())
        })?;

        tracing::debug!(transaction_id = %hash, gas_price = %gas_price, "submitted transaction");
        Ok(TransactionId::new(hash))
    }

    async fn get(&self, id: &TransactionId) -> Result<TransactionRecord> {
        let result = self
            .call("eth_getTransactionByHash", json!([id.as_str()]))
            .await?;
        if result.is_null() {
            return Err(GatewayError::NotFound(format!("transaction {}", id)));
        }

        let tx: RpcTransaction = serde_json::from_value(result)
            .map_err(|e| GatewayError::InvalidResponse(format!("malformed transaction: {}", e)))?;

        let block = match (tx.block_number, tx.block_hash) {
            (Some(number), Some(hash)) => Some(BlockRef {
                number: u64::try_from(parse_quantity(&number)?).map_err(|_| {
                    GatewayError::InvalidResponse(format!("block number {} too large", number))
                })?,
                hash,
            }),
            _ => None,
        };

        Ok(TransactionRecord {
            transaction_id: TransactionId::new(tx.hash),
            from: tx.from,
            call_data: decode_data(&tx.input)?,
            block,
        })
    }
}

fn to_quantity(n: u128) -> String {
    format!("0x{:x}", n)
}

fn parse_quantity(s: &str) -> Result<u128> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| GatewayError::InvalidResponse(format!("quantity {} lacks 0x prefix", s)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad quantity {}: {}", s, e)))
}

fn decode_data(s: &str) -> Result<Bytes> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad call data: {}", e)))
}
