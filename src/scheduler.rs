//! Fan-out of metric queries to an endpoint.
//!
//! A [`QueryPlan`] lists every (token, metric) pair once, tokens outer and
//! metrics inner. An [`Executor`] runs one task per plan entry under a
//! [`ConcurrencyPolicy`] and always returns results in plan order, whatever
//! order they complete in.
//!
//! The primary endpoint is queried with [`ConcurrencyPolicy::Sequential`]
//! (it throttles bursts), the mirror with [`ConcurrencyPolicy::Unbounded`].

use crate::config::ProtocolAddressTable;
use crate::error::ReconcilerResult;
use crate::fetcher::{fetch_metric, Observation};
use crate::market::{Metric, MetricKey, Token};
use crate::rpc::ContractQuery;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, info};

/// Ordered list of queries issued to each endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    keys: Vec<MetricKey>,
}

impl QueryPlan {
    /// Every combination of `tokens` and `metrics`, tokens outer.
    #[must_use]
    pub fn cross_product(tokens: &[Token], metrics: &[Metric]) -> Self {
        let keys = tokens
            .iter()
            .flat_map(|token| metrics.iter().map(|metric| MetricKey::new(*token, *metric)))
            .collect();
        Self { keys }
    }

    /// Plan covering all tokens and all metrics.
    #[must_use]
    pub fn full() -> Self {
        Self::cross_product(&Token::ALL, &Metric::ALL)
    }

    /// Keys in query order.
    #[must_use]
    pub fn keys(&self) -> &[MetricKey] {
        &self.keys
    }

    /// Number of queries per endpoint.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the plan has no queries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self::full()
    }
}

/// How many tasks of a batch may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// One at a time, in order.
    Sequential,
    /// At most `n` at a time.
    Bounded(NonZeroUsize),
    /// All tasks at once.
    Unbounded,
}

impl ConcurrencyPolicy {
    /// Effective in-flight limit for a batch of `tasks`.
    #[must_use]
    pub fn limit(self, tasks: usize) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Bounded(n) => n.get(),
            Self::Unbounded => tasks.max(1),
        }
    }
}

impl fmt::Display for ConcurrencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Bounded(n) => write!(f, "bounded({n})"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Runs task lists under a fixed concurrency policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    policy: ConcurrencyPolicy,
}

impl Executor {
    /// Executor with an explicit policy.
    #[must_use]
    pub const fn new(policy: ConcurrencyPolicy) -> Self {
        Self { policy }
    }

    /// One task in flight at a time.
    #[must_use]
    pub const fn sequential() -> Self {
        Self::new(ConcurrencyPolicy::Sequential)
    }

    /// Every task in flight at once.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(ConcurrencyPolicy::Unbounded)
    }

    /// Policy of this executor.
    #[must_use]
    pub const fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Run `task` for every input and collect outputs in input order.
    ///
    /// Futures are created up front but only start when polled, so no more
    /// than the policy limit ever make progress together.
    ///
    /// # Errors
    ///
    /// Returns the first error in input order; remaining tasks are dropped.
    pub async fn run<I, F, Fut, T>(&self, inputs: I, task: F) -> ReconcilerResult<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = ReconcilerResult<T>>,
    {
        let tasks: Vec<Fut> = inputs.into_iter().map(task).collect();
        let limit = self.policy.limit(tasks.len());

        stream::iter(tasks).buffered(limit).try_collect().await
    }
}

/// Query every entry of `plan` against `url`.
///
/// # Errors
///
/// Returns the first run-fatal fetch error.
pub async fn fetch_batch<C>(
    client: &C,
    addresses: &ProtocolAddressTable,
    plan: &QueryPlan,
    url: &str,
    executor: Executor,
) -> ReconcilerResult<Vec<Observation>>
where
    C: ContractQuery + ?Sized,
{
    info!(
        url,
        queries = plan.len(),
        policy = %executor.policy(),
        "Starting query batch"
    );

    let start = Instant::now();
    let observations = executor
        .run(plan.keys().iter().copied(), |key| {
            fetch_metric(client, addresses, key, url)
        })
        .await?;

    debug!(
        url,
        duration_ms = start.elapsed().as_millis(),
        "Query batch finished"
    );

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcilerError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl InFlight {
        async fn track(&self, delay_ms: u64) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_full_plan_enumerates_each_pair_once() {
        let plan = QueryPlan::full();
        assert_eq!(plan.len(), Token::ALL.len() * Metric::ALL.len());

        let unique: HashSet<_> = plan.keys().iter().collect();
        assert_eq!(unique.len(), plan.len());

        for token in Token::ALL {
            for metric in Metric::ALL {
                assert!(unique.contains(&MetricKey::new(token, metric)));
            }
        }
    }

    #[test]
    fn test_plan_order_is_token_major() {
        let plan = QueryPlan::cross_product(&[Token::Egld, Token::Mex], &Metric::ALL);
        assert_eq!(
            plan.keys(),
            &[
                MetricKey::new(Token::Egld, Metric::Cash),
                MetricKey::new(Token::Egld, Metric::TotalReserves),
                MetricKey::new(Token::Mex, Metric::Cash),
                MetricKey::new(Token::Mex, Metric::TotalReserves),
            ]
        );
    }

    #[test]
    fn test_policy_limits() {
        assert_eq!(ConcurrencyPolicy::Sequential.limit(8), 1);
        assert_eq!(ConcurrencyPolicy::Unbounded.limit(8), 8);
        assert_eq!(ConcurrencyPolicy::Unbounded.limit(0), 1);
        if let Some(n) = NonZeroUsize::new(3) {
            assert_eq!(ConcurrencyPolicy::Bounded(n).limit(8), 3);
        }
    }

    #[tokio::test]
    async fn test_unbounded_preserves_order() {
        let inflight = InFlight::default();
        // Later inputs finish first.
        let result = Executor::unbounded()
            .run(0..5u64, |i| {
                let inflight = &inflight;
                async move {
                    inflight.track(50 - i * 10).await;
                    Ok::<_, ReconcilerError>(i)
                }
            })
            .await;

        assert_eq!(result.ok(), Some(vec![0, 1, 2, 3, 4]));
        assert_eq!(inflight.peak.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_sequential_has_one_in_flight() {
        let inflight = InFlight::default();
        let result = Executor::sequential()
            .run(0..4u64, |i| {
                let inflight = &inflight;
                async move {
                    inflight.track(5).await;
                    Ok::<_, ReconcilerError>(i)
                }
            })
            .await;

        assert_eq!(result.ok(), Some(vec![0, 1, 2, 3]));
        assert_eq!(inflight.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_error_aborts_batch() {
        let started = AtomicUsize::new(0);
        let result = Executor::sequential()
            .run(0..4u64, |i| {
                let started = &started;
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(ReconcilerError::rpc("gateway down", None))
                    } else {
                        Ok(i)
                    }
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }
}
