//! Integration tests for a full reconciliation run.
//!
//! The contract gateway is replaced by an in-memory fake that answers per
//! (endpoint, contract, method), and records how many queries each endpoint
//! had in flight at once.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use money_market_reconciler::config::{Config, ProtocolAddressTable};
use money_market_reconciler::decoder::encode_biguint;
use money_market_reconciler::error::{ReconcilerError, ReconcilerResult};
use money_market_reconciler::market::{Metric, MetricKey, Token};
use money_market_reconciler::pipeline::Reconciler;
use money_market_reconciler::reconcile::Comparison;
use money_market_reconciler::rpc::{ContractQuery, QueryRequest, QueryResponse};
use money_market_reconciler::scheduler::{ConcurrencyPolicy, Executor};
use num_bigint::BigUint;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const PRIMARY: &str = "http://primary.test";
const SECONDARY: &str = "http://secondary.test";

enum Answer {
    Value(u128),
    Failed(&'static str),
    Fatal,
}

#[derive(Default)]
struct EndpointStats {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

/// Fake gateway: answers from a table, defaulting to `default_value`.
struct FakeGateway {
    addresses: ProtocolAddressTable,
    default_value: u128,
    overrides: Mutex<HashMap<(String, MetricKey), Answer>>,
    stats: HashMap<&'static str, EndpointStats>,
}

impl FakeGateway {
    fn new(default_value: u128) -> Self {
        let mut stats = HashMap::new();
        stats.insert(PRIMARY, EndpointStats::default());
        stats.insert(SECONDARY, EndpointStats::default());
        Self {
            addresses: ProtocolAddressTable::money_market().unwrap(),
            default_value,
            overrides: Mutex::new(HashMap::new()),
            stats,
        }
    }

    fn answer(self, url: &str, token: Token, metric: Metric, answer: Answer) -> Self {
        self.overrides
            .lock()
            .unwrap()
            .insert((url.to_string(), MetricKey::new(token, metric)), answer);
        self
    }

    fn key_for(&self, request: &QueryRequest) -> MetricKey {
        let token = Token::ALL
            .into_iter()
            .find(|t| self.addresses.address(*t).unwrap() == request.address)
            .expect("unknown contract address");
        let metric = Metric::ALL
            .into_iter()
            .find(|m| m.method() == request.method)
            .expect("unknown method");
        MetricKey::new(token, metric)
    }

    fn peak(&self, url: &str) -> usize {
        self.stats[url].peak.load(Ordering::SeqCst)
    }

    fn calls(&self, url: &str) -> usize {
        self.stats[url].calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractQuery for FakeGateway {
    async fn query(&self, request: &QueryRequest) -> ReconcilerResult<QueryResponse> {
        let stats = &self.stats[request.url.as_str()];
        stats.calls.fetch_add(1, Ordering::SeqCst);
        let now = stats.current.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(10)).await;
        stats.current.fetch_sub(1, Ordering::SeqCst);

        let key = self.key_for(request);
        let overrides = self.overrides.lock().unwrap();
        match overrides.get(&(request.url.clone(), key)) {
            Some(Answer::Value(v)) => Ok(QueryResponse::ok(vec![encode_biguint(&BigUint::from(*v))])),
            Some(Answer::Failed(code)) => Ok(QueryResponse::failed(*code, "execution failed")),
            Some(Answer::Fatal) => Err(ReconcilerError::rpc("connection reset", None)),
            None => Ok(QueryResponse::ok(vec![encode_biguint(&BigUint::from(
                self.default_value,
            ))])),
        }
    }
}

fn config() -> Config {
    Config::new(
        PRIMARY,
        SECONDARY,
        Duration::from_secs(30),
        ProtocolAddressTable::money_market().unwrap(),
    )
    .expect("valid test config")
}

#[tokio::test]
async fn test_identical_sources_report_nothing() {
    let gateway = FakeGateway::new(1_000_000_000_000_000_000);
    let report = Reconciler::new(config(), gateway).run().await.unwrap();

    assert_eq!(report.pairs_checked, 8);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_mismatch_is_reported_alone() {
    let gateway = FakeGateway::new(42)
        .answer(PRIMARY, Token::Mex, Metric::Cash, Answer::Value(7))
        .answer(SECONDARY, Token::Mex, Metric::Cash, Answer::Value(8));

    let report = Reconciler::new(config(), gateway).run().await.unwrap();

    assert_eq!(report.discrepancies.len(), 1);
    let record = &report.discrepancies[0];
    assert_eq!(record.key(), MetricKey::new(Token::Mex, Metric::Cash));
    assert_eq!(record.primary_value.as_deref(), Some("7"));
    assert_eq!(record.secondary_value.as_deref(), Some("8"));
    assert_eq!(record.comparison, Comparison::Different);
}

#[tokio::test]
async fn test_failed_query_is_incomparable() {
    let gateway = FakeGateway::new(5).answer(
        SECONDARY,
        Token::Usdc,
        Metric::TotalReserves,
        Answer::Failed("user error"),
    );

    let report = Reconciler::new(config(), gateway).run().await.unwrap();

    assert_eq!(report.discrepancies.len(), 1);
    let record = &report.discrepancies[0];
    assert_eq!(record.key(), MetricKey::new(Token::Usdc, Metric::TotalReserves));
    assert_eq!(record.primary_value.as_deref(), Some("5"));
    assert!(record.secondary_value.is_none());
    assert!(!record.are_equal());
}

#[tokio::test]
async fn test_fatal_query_aborts_run() {
    let gateway =
        FakeGateway::new(5).answer(PRIMARY, Token::Ride, Metric::Cash, Answer::Fatal);

    let result = Reconciler::new(config(), gateway).run().await;

    assert!(matches!(result, Err(ReconcilerError::RpcError { .. })));
}

#[tokio::test]
async fn test_primary_is_sequential_and_secondary_parallel() {
    let gateway = std::sync::Arc::new(FakeGateway::new(1));
    let reconciler = Reconciler::new(config(), std::sync::Arc::clone(&gateway));

    let report = reconciler.run().await.unwrap();
    assert!(report.is_clean());

    assert_eq!(gateway.calls(PRIMARY), 8);
    assert_eq!(gateway.calls(SECONDARY), 8);
    assert_eq!(gateway.peak(PRIMARY), 1);
    assert_eq!(gateway.peak(SECONDARY), 8);
}

#[tokio::test]
async fn test_custom_executors_bound_each_endpoint() {
    let gateway = std::sync::Arc::new(FakeGateway::new(1));
    let secondary = Executor::new(ConcurrencyPolicy::Bounded(NonZeroUsize::new(2).unwrap()));
    let reconciler = Reconciler::new(config(), std::sync::Arc::clone(&gateway))
        .with_executors(Executor::sequential(), secondary);

    let report = reconciler.run().await.unwrap();
    assert!(report.is_clean());

    assert_eq!(gateway.calls(SECONDARY), 8);
    assert_eq!(gateway.peak(PRIMARY), 1);
    assert_eq!(gateway.peak(SECONDARY), 2);
}
