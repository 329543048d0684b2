//! Tokens and metrics checked by the reconciler.
//!
//! Both sets are fixed at build time. Their declaration order is the
//! enumeration order used everywhere a query plan is built: tokens outer,
//! metrics inner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A money-market token. Each maps to one contract per protocol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    /// Native EGLD market
    Egld,
    /// MEX market
    Mex,
    /// RIDE market
    Ride,
    /// USDC market
    Usdc,
}

impl Token {
    /// All tokens in enumeration order.
    pub const ALL: [Self; 4] = [Self::Egld, Self::Mex, Self::Ride, Self::Usdc];

    /// Ticker symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Egld => "EGLD",
            Self::Mex => "MEX",
            Self::Ride => "RIDE",
            Self::Usdc => "USDC",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A money-market view queried on every token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    /// Liquid balance held by the market
    Cash,
    /// Reserves accumulated by the market
    TotalReserves,
}

impl Metric {
    /// All metrics in enumeration order.
    pub const ALL: [Self; 2] = [Self::Cash, Self::TotalReserves];

    /// Contract view function backing this metric.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Cash => "getCash",
            Self::TotalReserves => "getTotalReserves",
        }
    }

    /// Upper-case label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::TotalReserves => "TOTAL_RESERVES",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of one observation: which metric of which token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    /// Token whose contract is queried
    pub token: Token,
    /// Metric read from that contract
    pub metric: Metric,
}

impl MetricKey {
    /// Create a key.
    #[must_use]
    pub const fn new(token: Token, metric: Metric) -> Self {
        Self { token, metric }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token, self.metric)
    }
}
