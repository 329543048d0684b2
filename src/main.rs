//! Entry point for the money-market reconciler.
//!
//! # Flow
//!
//! ```text
//! main.rs (runtime + tracing)
//!     ↓
//! cli::run
//!     ↓
//! 1. config      → endpoints, timeout, address table
//! 2. scheduler   → primary batch (sequential), secondary batch (unbounded)
//! 3. fetcher     → contract query + big-uint decoding
//! 4. reconcile   → keyed merge
//! 5. report      → discrepancies to stdout
//! ```
//!
//! A run-fatal error is logged, printed to stderr, and exits with status 1;
//! no report is printed in that case.

use money_market_reconciler::{cli, observability};
use tracing::error;

#[tokio::main]
async fn main() {
    // - RUST_LOG: log filter (e.g. "debug")
    // - LOG_JSON: JSON console output ("true"/"false")
    // - LOG_FILE: additional daily-rotated JSON log file
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Reconciliation run failed");
        eprintln!("Error: {e}");
        drop(guard);
        std::process::exit(1);
    }
}
