//! HTTP contract query client.
//!
//! Talks to a MultiversX API (`POST {url}/query`). Every request shares one
//! `reqwest::Client`, so the configured timeout applies uniformly.
//!
//! ## Wire format
//!
//! ```text
//! → { "scAddress": "erd1…", "funcName": "getCash", "args": ["0a"] }
//! ← { "returnData": ["DeC2s6dkAAA="], "returnCode": "ok", "returnMessage": "" }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use money_market_reconciler::rpc::{ContractQuery, HttpQueryClient, QueryRequest};
//! use money_market_reconciler::error::ReconcilerResult;
//! use std::time::Duration;
//!
//! # async fn example() -> ReconcilerResult<()> {
//! let client = HttpQueryClient::new(Duration::from_secs(30))?;
//! let request = QueryRequest::new(
//!     "erd1qqqqqqqqqqqqqpgqm7ac3tpqm3z46wammaxn5ap0qtpl0falrkksp4vept",
//!     "getCash",
//!     "https://devnet-api.elrond.com",
//! );
//! let response = client.query(&request).await?;
//! println!("success: {}", response.is_success());
//! # Ok(())
//! # }
//! ```

use super::{ContractQuery, QueryRequest, QueryResponse};
use crate::error::{ReconcilerError, ReconcilerResult};
use alloy::primitives::hex;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Request body of `POST /query`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractQueryBody<'a> {
    sc_address: &'a str,
    func_name: &'a str,
    args: Vec<String>,
}

/// Response body of `POST /query`. Only the fields we use.
///
/// `returnCode` is required: a body without it is not a VM answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractQueryReply {
    #[serde(default)]
    return_data: Option<Vec<String>>,
    return_code: String,
    #[serde(default)]
    return_message: Option<String>,
}

/// Contract query client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpQueryClient {
    http: Client,
    timeout: Duration,
}

impl HttpQueryClient {
    /// Create a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an RPC error if the underlying HTTP client can't be built.
    pub fn new(timeout: Duration) -> ReconcilerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("money-market-reconciler/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReconcilerError::rpc("Failed to build HTTP client", Some(Box::new(e))))?;

        Ok(Self { http, timeout })
    }

    /// Timeout applied to each request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ContractQuery for HttpQueryClient {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, address = %request.address, duration_ms = tracing::field::Empty)
    )]
    async fn query(&self, request: &QueryRequest) -> ReconcilerResult<QueryResponse> {
        let endpoint = format!("{}/query", request.url.trim_end_matches('/'));
        let body = ContractQueryBody {
            sc_address: &request.address,
            func_name: &request.method,
            args: request.args.iter().map(hex::encode).collect(),
        };

        let start = Instant::now();
        let response = self
            .http
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let what = if e.is_timeout() { "timed out" } else { "failed" };
                ReconcilerError::rpc(
                    format!("Query {} on {endpoint} {what}", request.method),
                    Some(Box::new(e)),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReconcilerError::rpc(
                format!("Query {} on {endpoint} returned HTTP {status}: {detail}", request.method),
                None,
            ));
        }

        let reply: ContractQueryReply = response.json().await.map_err(|e| {
            ReconcilerError::decoding(
                format!("Malformed query response from {endpoint}"),
                Some(Box::new(e)),
            )
        })?;

        let duration = start.elapsed();
        tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

        let values = reply
            .return_data
            .unwrap_or_default()
            .iter()
            .map(|encoded| {
                STANDARD.decode(encoded).map_err(|e| {
                    ReconcilerError::decoding(
                        format!("returnData entry '{encoded}' is not valid base64"),
                        Some(Box::new(e)),
                    )
                })
            })
            .collect::<ReconcilerResult<Vec<_>>>()?;

        debug!(
            return_code = %reply.return_code,
            values = values.len(),
            duration_ms = duration.as_millis(),
            "Contract query completed"
        );

        Ok(QueryResponse {
            return_code: reply.return_code,
            return_message: reply.return_message.unwrap_or_default(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_serialization() {
        let body = ContractQueryBody {
            sc_address: "erd1xyz",
            func_name: "getCash",
            args: vec![hex::encode([0x0a_u8, 0xff])],
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["scAddress"], "erd1xyz");
        assert_eq!(json["funcName"], "getCash");
        assert_eq!(json["args"][0], "0aff");
    }

    #[test]
    fn test_reply_with_null_return_data() {
        let reply: Result<ContractQueryReply, _> = serde_json::from_str(
            r#"{"returnData":null,"returnCode":"function not found","returnMessage":"invalid function"}"#,
        );
        assert!(reply.is_ok());
        if let Ok(reply) = reply {
            assert!(reply.return_data.is_none());
            assert_eq!(reply.return_code, "function not found");
        }
    }

    #[test]
    fn test_reply_requires_return_code() {
        let reply: Result<ContractQueryReply, _> =
            serde_json::from_str(r#"{"data":{"returnData":["AQ=="],"returnCode":"ok"},"code":"successful"}"#);
        assert!(reply.is_err());
    }

    #[test]
    fn test_client_keeps_timeout() {
        let client = HttpQueryClient::new(Duration::from_secs(7));
        assert!(client.is_ok());
        if let Ok(client) = client {
            assert_eq!(client.timeout(), Duration::from_secs(7));
        }
    }
}
