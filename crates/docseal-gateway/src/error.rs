//! Error types for the gateway module.

use thiserror::Error;

/// Errors returned by content store, ledger and reporting gateways.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The requested content or transaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The remote service refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// No response within the configured timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout(e.to_string())
        } else if e.is_decode() {
            GatewayError::InvalidResponse(e.to_string())
        } else {
            GatewayError::Unavailable(e.to_string())
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
