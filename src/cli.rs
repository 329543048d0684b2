//! Command-line interface for the money-market reconciler.
//!
//! The binary takes no required arguments: it loads configuration, queries
//! both endpoints, and prints the discrepancy report to stdout.
//!
//! # Example
//!
//! ```bash
//! # Coloured text report
//! money-market-reconciler
//!
//! # Machine-readable report
//! money-market-reconciler --format json
//! ```

use crate::config::Config;
use crate::error::{ReconcilerError, ReconcilerResult};
use crate::pipeline::Reconciler;
use crate::report::OutputFormat;
use crate::rpc::{ContractQuery, HttpQueryClient};
use clap::Parser;
use std::io::Write;
use tracing::info;

/// Money-market state reconciler
#[derive(Parser, Debug)]
#[command(name = "money-market-reconciler")]
#[command(about = "Compares money-market contract state between two API providers", long_about = None)]
#[command(version)]
struct Cli {
    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Parse CLI arguments and run one reconciliation.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration loading fails
/// - Any query fails at the transport or decoding level
/// - The report can't be rendered or written
pub async fn run() -> ReconcilerResult<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        primary = config.primary_url(),
        secondary = config.secondary_url(),
        timeout_secs = config.query_timeout().as_secs(),
        "Configuration loaded"
    );

    let client = HttpQueryClient::new(config.query_timeout())?;
    let mut stdout = std::io::stdout();
    execute(cli.format, config, client, &mut stdout).await
}

/// Run one reconciliation with `client` and write the report to `out`.
///
/// Nothing is written unless the whole run succeeds.
///
/// # Errors
///
/// Returns the first run-fatal error, or an output error if the report
/// can't be rendered or written.
pub async fn execute<C, W>(
    format: OutputFormat,
    config: Config,
    client: C,
    out: &mut W,
) -> ReconcilerResult<()>
where
    C: ContractQuery,
    W: Write + ?Sized,
{
    let report = Reconciler::new(config, client).run().await?;
    let rendered = report.render(format)?;

    writeln!(out, "{rendered}")
        .and_then(|()| out.flush())
        .map_err(|e| ReconcilerError::output("Failed to write report", Some(Box::new(e))))
}
