//! End-to-end reconciliation run.
//!
//! ```text
//! QueryPlan ──► primary batch   (sequential) ──┐
//!          └──► secondary batch (unbounded)  ──┴─► reconcile ──► DiscrepancyReport
//! ```
//!
//! The primary batch completes before the secondary batch starts. Any
//! run-fatal error aborts the run before a report exists.

use crate::config::Config;
use crate::error::ReconcilerResult;
use crate::reconcile::reconcile;
use crate::report::DiscrepancyReport;
use crate::rpc::ContractQuery;
use crate::scheduler::{fetch_batch, Executor, QueryPlan};
use tracing::{info, instrument};

/// Runs the primary/secondary comparison for a fixed configuration.
pub struct Reconciler<C> {
    config: Config,
    client: C,
    plan: QueryPlan,
    primary: Executor,
    secondary: Executor,
}

impl<C: ContractQuery> Reconciler<C> {
    /// Reconciler over the full plan with the default executors.
    #[must_use]
    pub fn new(config: Config, client: C) -> Self {
        Self {
            config,
            client,
            plan: QueryPlan::full(),
            primary: Executor::sequential(),
            secondary: Executor::unbounded(),
        }
    }

    /// Replace the query plan.
    #[must_use]
    pub fn with_plan(mut self, plan: QueryPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Replace the executors used for each endpoint.
    #[must_use]
    pub const fn with_executors(mut self, primary: Executor, secondary: Executor) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// Query plan in use.
    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Query both endpoints, reconcile and build the report.
    ///
    /// # Errors
    ///
    /// Returns the first run-fatal error from either batch or from the merge.
    #[instrument(skip(self), fields(pairs = self.plan.len()))]
    pub async fn run(&self) -> ReconcilerResult<DiscrepancyReport> {
        let addresses = self.config.addresses();

        let primary = fetch_batch(
            &self.client,
            addresses,
            &self.plan,
            self.config.primary_url(),
            self.primary,
        )
        .await?;

        let secondary = fetch_batch(
            &self.client,
            addresses,
            &self.plan,
            self.config.secondary_url(),
            self.secondary,
        )
        .await?;

        let records = reconcile(&self.plan, &primary, &secondary)?;
        let report = DiscrepancyReport::new(
            self.config.primary_url(),
            self.config.secondary_url(),
            records,
        );

        info!(
            pairs = report.pairs_checked,
            discrepancies = report.discrepancies.len(),
            "Reconciliation complete"
        );

        Ok(report)
    }
}
