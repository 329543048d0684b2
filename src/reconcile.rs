//! Keyed merge of primary and secondary observations.
//!
//! Observations are joined by [`MetricKey`], never by position, and records
//! are emitted in plan order. Values compare by strict string equality:
//! `"500"` and `"0500"` are different.

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::fetcher::{FetchOutcome, Observation};
use crate::market::{Metric, MetricKey, Token};
use crate::scheduler::QueryPlan;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Result of comparing one pair of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Both sides returned the same value.
    Equal,
    /// Both sides returned a value and they differ.
    Different,
    /// At least one side has no value.
    Incomparable,
}

impl Comparison {
    /// Compare two optional decimal strings.
    #[must_use]
    pub fn of(primary: Option<&str>, secondary: Option<&str>) -> Self {
        match (primary, secondary) {
            (Some(a), Some(b)) if a == b => Self::Equal,
            (Some(_), Some(_)) => Self::Different,
            _ => Self::Incomparable,
        }
    }
}

/// One reconciled (token, metric) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRecord {
    /// Token compared
    pub token: Token,
    /// Metric compared
    pub metric: Metric,
    /// Primary endpoint value, if it returned one
    pub primary_value: Option<String>,
    /// Secondary endpoint value, if it returned one
    pub secondary_value: Option<String>,
    /// Outcome of the comparison
    pub comparison: Comparison,
}

impl ReconciledRecord {
    /// Build a record from the two sides' outcomes.
    #[must_use]
    pub fn new(key: MetricKey, primary: Option<&FetchOutcome>, secondary: Option<&FetchOutcome>) -> Self {
        let primary_value = primary.and_then(FetchOutcome::as_value).map(str::to_owned);
        let secondary_value = secondary.and_then(FetchOutcome::as_value).map(str::to_owned);
        let comparison = Comparison::of(primary_value.as_deref(), secondary_value.as_deref());

        Self {
            token: key.token,
            metric: key.metric,
            primary_value,
            secondary_value,
            comparison,
        }
    }

    /// Identity of the record.
    #[must_use]
    pub const fn key(&self) -> MetricKey {
        MetricKey::new(self.token, self.metric)
    }

    /// True only when both sides returned the same value.
    #[must_use]
    pub fn are_equal(&self) -> bool {
        self.comparison == Comparison::Equal
    }
}

fn index_by_key<'a>(
    side: &str,
    observations: &'a [Observation],
) -> ReconcilerResult<HashMap<MetricKey, &'a FetchOutcome>> {
    let mut index = HashMap::with_capacity(observations.len());
    for observation in observations {
        if index.insert(observation.key, &observation.outcome).is_some() {
            return Err(ReconcilerError::reconcile(format!(
                "{side} batch contains {} twice",
                observation.key
            )));
        }
    }
    Ok(index)
}

/// Merge both batches into one record per plan entry.
///
/// A key missing from a batch is treated like an unavailable outcome.
///
/// # Errors
///
/// Returns a reconcile error if either batch repeats a key.
pub fn reconcile(
    plan: &QueryPlan,
    primary: &[Observation],
    secondary: &[Observation],
) -> ReconcilerResult<Vec<ReconciledRecord>> {
    let primary = index_by_key("primary", primary)?;
    let secondary = index_by_key("secondary", secondary)?;

    let records: Vec<ReconciledRecord> = plan
        .keys()
        .iter()
        .map(|key| ReconciledRecord::new(*key, primary.get(key).copied(), secondary.get(key).copied()))
        .collect();

    debug!(
        records = records.len(),
        equal = records.iter().filter(|r| r.are_equal()).count(),
        "Reconciled batches"
    );

    Ok(records)
}
