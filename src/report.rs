//! Discrepancy reporting.
//!
//! Only records that are not equal survive: both real value differences and
//! pairs where a side had no value. An empty report means every checked pair
//! matched.

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::reconcile::{Comparison, ReconciledRecord};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable coloured lines
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
}

/// Keep only records whose values are not equal.
#[must_use]
pub fn discrepancies(records: Vec<ReconciledRecord>) -> Vec<ReconciledRecord> {
    records.into_iter().filter(|r| !r.are_equal()).collect()
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscrepancyReport {
    /// When the run finished
    pub checked_at: DateTime<Utc>,
    /// Primary endpoint
    pub primary_url: String,
    /// Secondary endpoint
    pub secondary_url: String,
    /// Number of (token, metric) pairs compared
    pub pairs_checked: usize,
    /// Pairs whose values are not equal
    pub discrepancies: Vec<ReconciledRecord>,
}

impl DiscrepancyReport {
    /// Build a report from reconciled records.
    #[must_use]
    pub fn new(
        primary_url: impl Into<String>,
        secondary_url: impl Into<String>,
        records: Vec<ReconciledRecord>,
    ) -> Self {
        let pairs_checked = records.len();
        Self {
            checked_at: Utc::now(),
            primary_url: primary_url.into(),
            secondary_url: secondary_url.into(),
            pairs_checked,
            discrepancies: discrepancies(records),
        }
    }

    /// Whether every pair matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Render in the requested format.
    ///
    /// # Errors
    ///
    /// Returns a decoding error if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> ReconcilerResult<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self).map_err(|e| {
                ReconcilerError::output("Failed to serialize report", Some(Box::new(e)))
            }),
        }
    }

    fn render_text(&self) -> String {
        let timestamp = self.checked_at.format("%Y-%m-%d %H:%M:%S UTC");

        if self.is_clean() {
            return format!(
                "{} {} {}",
                "✅".green(),
                timestamp.to_string().dimmed(),
                format!("No discrepancies across {} pairs", self.pairs_checked)
                    .green()
                    .bold()
            );
        }

        let mut out = format!(
            "{} {} {}\n",
            "⚠️".yellow(),
            timestamp.to_string().dimmed(),
            format!(
                "{} of {} pairs differ",
                self.discrepancies.len(),
                self.pairs_checked
            )
            .yellow()
            .bold()
        );

        for record in &self.discrepancies {
            let status = match record.comparison {
                Comparison::Different => "DIFFERENT".red().bold(),
                Comparison::Incomparable => "MISSING".magenta().bold(),
                Comparison::Equal => "EQUAL".green(),
            };
            let _ = writeln!(
                out,
                "  {:<5} {:<15} primary: {} | secondary: {} [{}]",
                record.token.symbol().cyan(),
                record.metric.label(),
                display_value(record.primary_value.as_deref()).blue(),
                display_value(record.secondary_value.as_deref()).blue(),
                status
            );
        }

        out.trim_end().to_string()
    }
}

fn display_value(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
