//! Metric fetchers.
//!
//! One fetch reads one metric of one token from one endpoint and returns an
//! [`Observation`]. A non-success VM return code is a soft failure: it yields
//! [`FetchOutcome::Unavailable`] instead of an error, so the reconciler can
//! tell "missing data" apart from "different data".

use crate::config::ProtocolAddressTable;
use crate::decoder::decode_biguint;
use crate::error::{ReconcilerError, ReconcilerResult};
use crate::market::{Metric, MetricKey, Token};
use crate::rpc::{ContractQuery, QueryRequest};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Result of a single metric query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Decoded decimal value.
    Value {
        /// Canonical base-10 string
        value: String,
    },
    /// The contract answered with a non-success return code.
    Unavailable {
        /// VM return code
        return_code: String,
        /// VM message
        message: String,
    },
}

impl FetchOutcome {
    /// Successful outcome.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value {
            value: value.into(),
        }
    }

    /// Decoded value, if any.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value { value } => Some(value),
            Self::Unavailable { .. } => None,
        }
    }
}

/// A fetch outcome tagged with what was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// Token/metric identity
    pub key: MetricKey,
    /// What the endpoint returned
    pub outcome: FetchOutcome,
}

/// Query `key.metric` on `key.token`'s contract at `url`.
///
/// # Errors
///
/// Returns an error if:
/// - The token has no configured address
/// - The query itself fails (transport, timeout, malformed body)
/// - A successful response carries no value
#[instrument(skip(client, addresses), fields(token = %key.token, metric = %key.metric))]
pub async fn fetch_metric<C>(
    client: &C,
    addresses: &ProtocolAddressTable,
    key: MetricKey,
    url: &str,
) -> ReconcilerResult<Observation>
where
    C: ContractQuery + ?Sized,
{
    let address = addresses.address(key.token)?;
    let request = QueryRequest::new(address, key.metric.method(), url);

    let response = client.query(&request).await?;

    if !response.is_success() {
        warn!(
            url,
            return_code = %response.return_code,
            message = %response.return_message,
            "Query did not succeed"
        );
        return Ok(Observation {
            key,
            outcome: FetchOutcome::Unavailable {
                return_code: response.return_code,
                message: response.return_message,
            },
        });
    }

    let raw = response.values.first().ok_or_else(|| {
        ReconcilerError::decoding(format!("{key} on {url} succeeded without a return value"), None)
    })?;
    let value = decode_biguint(raw);

    debug!(url, value = %value, "Metric fetched");

    Ok(Observation {
        key,
        outcome: FetchOutcome::value(value),
    })
}

/// Fetch the cash held by `token`'s market.
///
/// # Errors
///
/// See [`fetch_metric`].
pub async fn get_cash<C>(
    client: &C,
    addresses: &ProtocolAddressTable,
    token: Token,
    url: &str,
) -> ReconcilerResult<Observation>
where
    C: ContractQuery + ?Sized,
{
    fetch_metric(client, addresses, MetricKey::new(token, Metric::Cash), url).await
}

/// Fetch the total reserves of `token`'s market.
///
/// # Errors
///
/// See [`fetch_metric`].
pub async fn get_total_reserves<C>(
    client: &C,
    addresses: &ProtocolAddressTable,
    token: Token,
    url: &str,
) -> ReconcilerResult<Observation>
where
    C: ContractQuery + ?Sized,
{
    fetch_metric(client, addresses, MetricKey::new(token, Metric::TotalReserves), url).await
}
