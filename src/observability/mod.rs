//! Structured logging setup.
//!
//! Logging uses the tracing framework. Logs go to stderr so stdout carries
//! only the discrepancy report.
//!
//! # Usage
//!
//! ```no_run
//! use money_market_reconciler::observability;
//!
//! # fn main() -> eyre::Result<()> {
//! // Pretty stderr output at the default level
//! let _guard = observability::init_tracing(None, None, false)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Verbose query logging
//! RUST_LOG=money_market_reconciler=debug money-market-reconciler
//!
//! # JSON logs for aggregation
//! LOG_JSON=true money-market-reconciler
//!
//! # Also write logs to a daily-rotated file
//! LOG_FILE=./logs/reconciler.log money-market-reconciler
//! ```

use eyre::WrapErr;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_FILTER: &str = "money_market_reconciler=info,warn";

/// Initialize the tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Filter used when `RUST_LOG` is unset (e.g. `"debug"`).
/// * `log_file` - Optional file path; enables an extra JSON layer with daily rotation.
/// * `json_output` - JSON console output instead of the pretty format.
///
/// The returned guard flushes the file writer when dropped. Keep it alive
/// for the life of the process.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - A global subscriber is already installed
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> eyre::Result<Option<WorkerGuard>> {
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    };

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(ref path) = log_file {
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)
            .wrap_err_with(|| format!("creating log directory {}", directory.display()))?;

        let file_appender = tracing_appender::rolling::daily(
            directory,
            path.file_name().unwrap_or_else(|| OsStr::new("reconciler.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("installing tracing subscriber")?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(guard)
}
