//! HTTP adapters for the gateway traits.
//!
//! - [`IpfsContentStore`] - IPFS HTTP API (`/api/v0/add`, `/api/v0/cat`)
//! - [`JsonRpcLedger`] - Ethereum-style JSON-RPC node
//! - [`HttpReportSink`] - JSON POST to a reporting endpoint

pub mod ipfs;
pub mod rpc;
pub mod sink;

pub use ipfs::IpfsContentStore;
pub use rpc::JsonRpcLedger;
pub use sink::HttpReportSink;

use std::time::Duration;

use crate::error::{GatewayError, Result};

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Unavailable(format!("failed to build HTTP client: {}", e)))
}

/// Map a non-success status to an error, keeping the body for context.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
    Err(if status == reqwest::StatusCode::NOT_FOUND {
        GatewayError::NotFound(message)
    } else if status.is_client_error() {
        GatewayError::Rejected(message)
    } else {
        GatewayError::Unavailable(message)
    })
}
