//! Contract query boundary.
//!
//! Read-only smart-contract calls go through the [`ContractQuery`] trait. The
//! production implementation is [`HttpQueryClient`], which speaks the
//! MultiversX API `/query` protocol; tests substitute in-memory fakes.
//!
//! # Architecture
//!
//! ```text
//!   fetcher::fetch_metric
//!          │  QueryRequest { address, method, args, url }
//!          ▼
//!   ┌──────────────────┐
//!   │  ContractQuery   │──► HttpQueryClient ──► POST {url}/query
//!   └──────────────────┘
//!          │  QueryResponse { return_code, values }
//!          ▼
//! ```

pub mod http;

pub use http::HttpQueryClient;

use crate::error::ReconcilerResult;
use async_trait::async_trait;

/// Return code the VM reports for a successful view call.
pub const RETURN_CODE_OK: &str = "ok";

/// One read-only contract call against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Bech32 contract address
    pub address: String,
    /// View function name
    pub method: String,
    /// Raw call arguments
    pub args: Vec<Vec<u8>>,
    /// Base URL of the API serving the query
    pub url: String,
}

impl QueryRequest {
    /// Create a request without arguments.
    #[must_use]
    pub fn new(address: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            method: method.into(),
            args: Vec::new(),
            url: url.into(),
        }
    }

    /// Attach raw arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Vec<u8>>) -> Self {
        self.args = args;
        self
    }
}

/// Parsed outcome of a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    /// VM return code (`ok`, `user error`, `function not found`, ...)
    pub return_code: String,
    /// VM message accompanying a failure
    pub return_message: String,
    /// Raw return values in order
    pub values: Vec<Vec<u8>>,
}

impl QueryResponse {
    /// Successful response carrying `values`.
    #[must_use]
    pub fn ok(values: Vec<Vec<u8>>) -> Self {
        Self {
            return_code: RETURN_CODE_OK.to_string(),
            return_message: String::new(),
            values,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failed(return_code: impl Into<String>, return_message: impl Into<String>) -> Self {
        Self {
            return_code: return_code.into(),
            return_message: return_message.into(),
            values: Vec::new(),
        }
    }

    /// Whether the VM reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.return_code == RETURN_CODE_OK
    }
}

/// Performs read-only contract calls.
///
/// A response with a non-success return code is returned as `Ok`; only
/// transport and decoding failures are errors.
#[async_trait]
pub trait ContractQuery: Send + Sync {
    /// Execute `request` against `request.url`.
    async fn query(&self, request: &QueryRequest) -> ReconcilerResult<QueryResponse>;
}

#[async_trait]
impl<T: ContractQuery + ?Sized> ContractQuery for std::sync::Arc<T> {
    async fn query(&self, request: &QueryRequest) -> ReconcilerResult<QueryResponse> {
        (**self).query(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success() {
        assert!(QueryResponse::ok(vec![vec![1]]).is_success());
        assert!(!QueryResponse::failed("user error", "storage decode error").is_success());
    }

    #[test]
    fn test_request_builder() {
        let request = QueryRequest::new("erd1abc", "getCash", "https://api.example")
            .with_args(vec![vec![0x01]]);
        assert_eq!(request.method, "getCash");
        assert_eq!(request.args, vec![vec![0x01]]);
    }
}
