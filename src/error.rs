//! Error types for the money-market reconciler.
//!
//! This module provides a unified error type [`ReconcilerError`] covering every
//! run-fatal failure of a reconciliation run.
//!
//! # Design
//!
//! Two tiers of failure exist:
//! - A contract call that answers with a non-success return code is **not** an
//!   error. It becomes [`FetchOutcome::Unavailable`](crate::fetcher::FetchOutcome)
//!   and flows through reconciliation as an incomparable observation.
//! - Everything else is run-fatal and is one of:
//!   - [`ReconcilerError::ConfigError`]: Configuration and environment issues
//!   - [`ReconcilerError::RpcError`]: Transport, timeout and HTTP status errors
//!   - [`ReconcilerError::DecodingError`]: Malformed response bodies or values
//!   - [`ReconcilerError::ReconcileError`]: Inconsistent result batches
//!   - [`ReconcilerError::OutputError`]: The report could not be written
//!
//! # Example
//!
//! ```
//! use money_market_reconciler::error::{ReconcilerError, ReconcilerResult};
//!
//! fn require_value(values: &[Vec<u8>]) -> ReconcilerResult<&[u8]> {
//!     values
//!         .first()
//!         .map(Vec::as_slice)
//!         .ok_or_else(|| ReconcilerError::decoding("query returned no values", None))
//! }
//! # assert!(require_value(&[]).is_err());
//! ```

use std::fmt;

/// Result type alias using [`ReconcilerError`].
pub type ReconcilerResult<T> = Result<T, ReconcilerError>;

/// Boxed source error carried by [`ReconcilerError`] variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for a reconciliation run.
#[derive(Debug)]
pub enum ReconcilerError {
    /// Configuration or environment variable errors.
    ///
    /// Variants include:
    /// - Invalid endpoint URLs
    /// - Malformed contract addresses
    /// - Non-numeric timeout values
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Gateway transport errors.
    ///
    /// Variants include:
    /// - Connection failures
    /// - Request timeout
    /// - Non-2xx HTTP status
    RpcError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Response or value decoding errors.
    ///
    /// Variants include:
    /// - Unexpected JSON shape
    /// - Invalid base64 return data
    /// - Missing `returnCode`
    /// - Successful query without return values
    DecodingError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Result batches that cannot be merged.
    ReconcileError {
        /// Human-readable error message
        message: String,
    },

    /// Report rendering or writing errors.
    OutputError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },
}

impl ReconcilerError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use money_market_reconciler::error::ReconcilerError;
    ///
    /// let err = ReconcilerError::config("PRIMARY_API_URL is not a URL", None);
    /// assert!(matches!(err, ReconcilerError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new RPC error.
    ///
    /// # Example
    ///
    /// ```
    /// use money_market_reconciler::error::ReconcilerError;
    ///
    /// let err = ReconcilerError::rpc("gateway timed out", None);
    /// assert!(matches!(err, ReconcilerError::RpcError { .. }));
    /// ```
    #[must_use]
    pub fn rpc(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::RpcError {
            message: message.into(),
            source,
        }
    }

    /// Create a new decoding error.
    ///
    /// # Example
    ///
    /// ```
    /// use money_market_reconciler::error::ReconcilerError;
    ///
    /// let err = ReconcilerError::decoding("returnData is not base64", None);
    /// assert!(matches!(err, ReconcilerError::DecodingError { .. }));
    /// ```
    #[must_use]
    pub fn decoding(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::DecodingError {
            message: message.into(),
            source,
        }
    }

    /// Create a new reconciliation error.
    #[must_use]
    pub fn reconcile(message: impl Into<String>) -> Self {
        Self::ReconcileError {
            message: message.into(),
        }
    }

    /// Create a new output error.
    #[must_use]
    pub fn output(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::OutputError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for ReconcilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::RpcError { message, .. } => write!(f, "RPC error: {message}"),
            Self::DecodingError { message, .. } => write!(f, "Decoding error: {message}"),
            Self::ReconcileError { message } => write!(f, "Reconcile error: {message}"),
            Self::OutputError { message, .. } => write!(f, "Output error: {message}"),
        }
    }
}

impl std::error::Error for ReconcilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::RpcError { source, .. }
            | Self::DecodingError { source, .. }
            | Self::OutputError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::ReconcileError { .. } => None,
        }
    }
}
