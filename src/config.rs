//! Configuration management for the reconciler.
//!
//! Endpoints and the query timeout are loaded from environment variables using
//! the `dotenvy` crate. The token set, metric set and contract address table
//! are build-time constants, but they travel inside [`Config`] so tests can
//! substitute fake addresses and endpoints.
//!
//! ## Environment Variables
//!
//! Optional (with defaults):
//! - `PRIMARY_API_URL`: Primary network API (default: MultiversX devnet API)
//! - `SECONDARY_API_URL`: Mirror API (default: Blast devnet mirror)
//! - `QUERY_TIMEOUT_SECS`: Per-request timeout in seconds (default: 30)
//! - `RUST_LOG`: Logging level (default: "info")
//!
//! ## Example
//!
//! ```no_run
//! use money_market_reconciler::config::Config;
//! use money_market_reconciler::error::ReconcilerResult;
//!
//! # fn main() -> ReconcilerResult<()> {
//! let config = Config::from_env()?;
//! println!("Primary: {}", config.primary_url());
//! # Ok(())
//! # }
//! ```

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::market::Token;
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

/// Default primary endpoint.
pub const DEFAULT_PRIMARY_URL: &str = "https://devnet-api.elrond.com";

/// Default secondary (mirror) endpoint.
pub const DEFAULT_SECONDARY_URL: &str =
    "https://elrond-api-devnet.blastapi.io/418251a5-31f5-4f21-8d38-9491009752e0";

/// Default per-request timeout.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

const BECH32_PREFIX: &str = "erd1";
const BECH32_ADDRESS_LEN: usize = 62;

/// Contract addresses of the money-market protocol instance, one per token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolAddressTable {
    addresses: BTreeMap<Token, String>,
}

impl ProtocolAddressTable {
    /// Build a table from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a token is missing or an address is
    /// not a bech32 `erd1…` address.
    pub fn new<I, S>(entries: I) -> ReconcilerResult<Self>
    where
        I: IntoIterator<Item = (Token, S)>,
        S: Into<String>,
    {
        let addresses: BTreeMap<Token, String> = entries
            .into_iter()
            .map(|(token, address)| (token, address.into()))
            .collect();

        for token in Token::ALL {
            let address = addresses.get(&token).ok_or_else(|| {
                ReconcilerError::config(format!("no contract address for {token}"), None)
            })?;
            validate_address(address)?;
        }

        Ok(Self { addresses })
    }

    /// Addresses of the deployed money markets.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a built-in address is malformed.
    pub fn money_market() -> ReconcilerResult<Self> {
        Self::new([
            (Token::Egld, "erd1qqqqqqqqqqqqqpgqm7ac3tpqm3z46wammaxn5ap0qtpl0falrkksp4vept"),
            (Token::Mex, "erd1qqqqqqqqqqqqqpgq6ee8tgeq4hcucccxvfv8v3q368tr5ljcrkksn75yww"),
            (Token::Ride, "erd1qqqqqqqqqqqqqpgqdk0yjw6d3dmfedf7j4k94qlgdprulwq4rkkslgwl4x"),
            (Token::Usdc, "erd1qqqqqqqqqqqqqpgqtnsfu5vr70tz52k6vx94e7ttn8rdy6nnrkkswrrtv9"),
        ])
    }

    /// Contract address for `token`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token has no entry.
    pub fn address(&self, token: Token) -> ReconcilerResult<&str> {
        self.addresses
            .get(&token)
            .map(String::as_str)
            .ok_or_else(|| ReconcilerError::config(format!("no contract address for {token}"), None))
    }
}

/// Immutable run configuration passed into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary network API base URL
    primary_url: String,

    /// Secondary mirror API base URL
    secondary_url: String,

    /// Timeout applied to every contract query
    query_timeout: Duration,

    /// Contract address per token
    addresses: ProtocolAddressTable,
}

impl Config {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either URL is not an HTTP(S) URL or
    /// the timeout is zero.
    pub fn new(
        primary_url: impl Into<String>,
        secondary_url: impl Into<String>,
        query_timeout: Duration,
        addresses: ProtocolAddressTable,
    ) -> ReconcilerResult<Self> {
        let primary_url = normalize_url("PRIMARY_API_URL", primary_url.into())?;
        let secondary_url = normalize_url("SECONDARY_API_URL", secondary_url.into())?;

        if query_timeout.is_zero() {
            return Err(ReconcilerError::config(
                "QUERY_TIMEOUT_SECS must be greater than zero",
                None,
            ));
        }

        Ok(Self {
            primary_url,
            secondary_url,
            query_timeout,
            addresses,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Loads `.env` if present, then applies defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A URL variable is set to something that isn't an HTTP(S) URL
    /// - `QUERY_TIMEOUT_SECS` is not a positive integer
    pub fn from_env() -> ReconcilerResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        let primary_url =
            env::var("PRIMARY_API_URL").unwrap_or_else(|_| DEFAULT_PRIMARY_URL.to_string());

        let secondary_url =
            env::var("SECONDARY_API_URL").unwrap_or_else(|_| DEFAULT_SECONDARY_URL.to_string());

        let timeout_secs = env::var("QUERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_QUERY_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ReconcilerError::config(
                    "QUERY_TIMEOUT_SECS must be a valid number of seconds",
                    Some(Box::new(e)),
                )
            })?;

        Self::new(
            primary_url,
            secondary_url,
            Duration::from_secs(timeout_secs),
            ProtocolAddressTable::money_market()?,
        )
    }

    /// Get the primary API base URL.
    #[must_use]
    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    /// Get the secondary API base URL.
    #[must_use]
    pub fn secondary_url(&self) -> &str {
        &self.secondary_url
    }

    /// Get the per-query timeout.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Get the contract address table.
    #[must_use]
    pub const fn addresses(&self) -> &ProtocolAddressTable {
        &self.addresses
    }
}

fn normalize_url(name: &str, url: String) -> ReconcilerResult<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ReconcilerError::config(
            format!("{name} must be an http(s) URL, got: '{url}'"),
            None,
        ));
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn validate_address(address: &str) -> ReconcilerResult<()> {
    if !address.starts_with(BECH32_PREFIX) || address.len() != BECH32_ADDRESS_LEN {
        return Err(ReconcilerError::config(
            format!(
                "contract address must be a bech32 address ({BECH32_PREFIX} + 58 chars), got: {address}"
            ),
            None,
        ));
    }
    Ok(())
}
