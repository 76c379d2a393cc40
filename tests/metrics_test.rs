//! Tests for metrics emitted by the batch orchestrator and cache.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use trendfeed::batch::{BatchOrchestrator, BatchRequest};
use trendfeed::cache::ResponseCache;
use trendfeed::fetch::TrendsFetcher;
use trendfeed::telemetry;
use trendfeed::types::{FetchKey, FetchOptions, TrendRecord};
use trendfeed::{Result, TrendsError};

// ============================================================================
// Mock fetcher
// ============================================================================

/// Succeeds for every key except `XX`.
struct MockFetcher;

#[async_trait]
impl TrendsFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        key: &FetchKey,
        _options: &FetchOptions,
        _connection: Option<&reqwest::Client>,
    ) -> Result<Vec<TrendRecord>> {
        if key.as_str() == "XX" {
            return Err(TrendsError::Network("unreachable".into()));
        }
        Ok(vec![TrendRecord::new("t", 1)])
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum counter values for `name`, optionally filtered by one label.
fn counter_total(snapshot: &SnapshotVec, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            label.is_none_or(|(k, v)| {
                key.key()
                    .labels()
                    .any(|l| l.key() == k && l.value() == v)
            })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn keys(codes: &[&str]) -> Vec<FetchKey> {
    FetchKey::parse_all(codes).unwrap()
}

/// Run two identical batches under a local recorder and return the snapshot.
///
/// `block_in_place` keeps the sync `with_local_recorder` closure on the
/// current thread while `block_on` drives the batches.
fn record_two_batches(codes: &[&str]) -> SnapshotVec {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let orchestrator =
                    BatchOrchestrator::new(Arc::new(MockFetcher), Arc::new(ResponseCache::default()));
                orchestrator.run_batch(BatchRequest::new(keys(codes))).await;
                orchestrator.run_batch(BatchRequest::new(keys(codes))).await;
            })
        })
    });

    snapshotter.snapshot().into_vec()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn fetches_record_request_metrics() {
    let snapshot = record_two_batches(&["US", "XX"]);

    // US is fetched once then cached; XX fails both times.
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL, None), 3);
    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL, Some(("status", "ok"))),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL, Some(("status", "error"))),
        2
    );
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cache_lookups_are_counted() {
    let snapshot = record_two_batches(&["US", "GB"]);

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, None), 2);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, None), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn batch_keys_are_counted_by_source() {
    let snapshot = record_two_batches(&["US", "GB"]);

    assert_eq!(counter_total(&snapshot, telemetry::BATCH_KEYS_TOTAL, None), 4);
    assert_eq!(
        counter_total(&snapshot, telemetry::BATCH_KEYS_TOTAL, Some(("source", "cache"))),
        2
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::BATCH_KEYS_TOTAL, Some(("source", "fetch"))),
        2
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let orchestrator =
        BatchOrchestrator::new(Arc::new(MockFetcher), Arc::new(ResponseCache::default()));
    let result = orchestrator.run_batch(BatchRequest::new(keys(&["US"]))).await;
    assert_eq!(result.success_count(), 1);
}
