//! # Money-Market State Reconciler
//!
//! Cross-checks money-market contract state reported by two independent
//! MultiversX API providers and reports every pair of values that disagree.
//!
//! For each token (EGLD, MEX, RIDE, USDC) the `getCash` and
//! `getTotalReserves` views are queried on the primary API one request at a
//! time and on the mirror API all at once. Results are joined by
//! (token, metric) and compared as decimal strings.
//!
//! ## Architecture
//!
//! 1. **Config** ([`config`]) - Endpoints, timeout, contract address table
//! 2. **Market** ([`market`]) - Token and metric enumerations
//! 3. **RPC** ([`rpc`]) - Contract query boundary and HTTP client
//! 4. **Decoder** ([`decoder`]) - Big-endian bytes to decimal strings
//! 5. **Fetcher** ([`fetcher`]) - One metric of one token from one endpoint
//! 6. **Scheduler** ([`scheduler`]) - Query plan and concurrency policies
//! 7. **Reconcile** ([`reconcile`]) - Keyed merge and comparison
//! 8. **Report** ([`report`]) - Discrepancy filtering and rendering
//! 9. **Pipeline** ([`pipeline`]) - End-to-end run
//!
//! ## Using as a Library
//!
//! ```rust,no_run
//! use money_market_reconciler::{config::Config, pipeline::Reconciler, rpc::HttpQueryClient};
//! use money_market_reconciler::report::OutputFormat;
//!
//! # async fn example() -> money_market_reconciler::error::ReconcilerResult<()> {
//! let config = Config::from_env()?;
//! let client = HttpQueryClient::new(config.query_timeout())?;
//! let report = Reconciler::new(config, client).run().await?;
//! println!("{}", report.render(OutputFormat::Text)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! A contract call answering with a non-success return code is not an error;
//! it shows up in the report as a pair that couldn't be compared. Transport,
//! timeout and decoding failures abort the run with a
//! [`error::ReconcilerError`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fetcher;
pub mod market;
pub mod observability;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod rpc;
pub mod scheduler;
