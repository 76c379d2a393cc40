//! Batch orchestration over the fetcher, cache and governor.
//!
//! For every key the orchestrator:
//!
//! 1. computes the [`Fingerprint`] of `(key, options)`;
//! 2. on a fresh cache hit (when `use_cache` is set) returns the cached
//!    records without touching the fetcher;
//! 3. otherwise waits on the per-batch [`RateGovernor`] (and the shared one,
//!    if configured), fetches through the optional shared connection, and
//!    writes successful results back to the cache;
//! 4. reports progress once the key resolves.
//!
//! A failing key is recorded and the batch carries on. Nothing is retried
//! here; [`TrendsError::is_transient`](crate::TrendsError::is_transient)
//! lets callers layer retries on top.
//!
//! # Scheduling
//!
//! Sequential mode resolves keys one after another in input order.
//! Concurrent mode drives up to `concurrency` keys at once via
//! `buffer_unordered`, yielding in completion order. All work lives inside
//! the returned stream: dropping it abandons in-flight fetches and nothing
//! outlives the batch.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::progress::{LogProgress, NoProgress, ProgressSink};
use super::result::{BatchRequest, BatchResult, ScheduleMode};
use crate::Result;
use crate::cache::{Fingerprint, ResponseCache};
use crate::fetch::TrendsFetcher;
use crate::governor::RateGovernor;
use crate::telemetry;
use crate::types::{FetchKey, FetchOptions, TrendRecord};

/// One resolved key of a batch.
pub type BatchItem = (FetchKey, Result<Vec<TrendRecord>>);

#[derive(Debug, Clone, Copy)]
enum Source {
    Cache,
    Fetch,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Fetch => "fetch",
        }
    }
}

/// State shared by every key of one batch.
struct BatchContext {
    options: FetchOptions,
    connection: Option<reqwest::Client>,
    governor: RateGovernor,
    use_cache: bool,
}

/// Drives fetches for many keys through the cache and rate governor.
///
/// Cheap to clone; clones share the fetcher, cache, governor and sink.
#[derive(Clone)]
pub struct BatchOrchestrator {
    fetcher: Arc<dyn TrendsFetcher>,
    cache: Arc<ResponseCache>,
    governor: Option<Arc<RateGovernor>>,
    progress: Arc<dyn ProgressSink>,
}

impl BatchOrchestrator {
    pub fn new(fetcher: Arc<dyn TrendsFetcher>, cache: Arc<ResponseCache>) -> Self {
        Self {
            fetcher,
            cache,
            governor: None,
            progress: Arc::new(LogProgress),
        }
    }

    /// Gate every outbound call on a governor shared beyond a single batch.
    ///
    /// Applies to single fetches and batches alike, on top of each batch's
    /// own pacing and ceiling.
    pub fn with_governor(mut self, governor: Arc<RateGovernor>) -> Self {
        self.governor = Some(governor);
        self
    }

    /// Sink used by batches that set `show_progress`. Default: [`LogProgress`].
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &Arc<dyn TrendsFetcher> {
        &self.fetcher
    }

    /// Fetch a single key through the cache; errors propagate directly.
    pub async fn fetch_one(
        &self,
        key: &FetchKey,
        options: &FetchOptions,
        use_cache: bool,
    ) -> Result<Vec<TrendRecord>> {
        self.resolve(key, options, None, None, use_cache).await.0
    }

    /// Run a batch to completion.
    ///
    /// The result holds exactly one entry per distinct input key, success
    /// or failure.
    pub async fn run_batch(&self, request: BatchRequest) -> BatchResult {
        let started = Instant::now();
        let mut result = BatchResult::new();
        let mut resolved = self.stream(request);
        while let Some((key, outcome)) = resolved.next().await {
            result.insert(key, outcome);
        }
        info!(
            keys = result.len(),
            failed = result.failure_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        result
    }

    /// Run a batch until `deadline`.
    ///
    /// Keys resolved before the deadline are kept; the rest are abandoned
    /// (in-flight fetches are dropped) and listed in
    /// [`BatchResult::pending`].
    pub async fn run_batch_until(&self, request: BatchRequest, deadline: Instant) -> BatchResult {
        let keys = request.unique_keys();
        let mut result = BatchResult::new();
        let mut resolved = self.stream(request);
        loop {
            match tokio::time::timeout_at(deadline, resolved.next()).await {
                Ok(Some((key, outcome))) => result.insert(key, outcome),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        resolved = result.len(),
                        total = keys.len(),
                        "batch deadline reached, abandoning remaining keys"
                    );
                    break;
                }
            }
        }
        drop(resolved);

        let pending = keys.into_iter().filter(|k| !result.contains(k)).collect();
        result.set_pending(pending);
        result
    }

    /// Run a batch for at most `timeout`. See [`run_batch_until`](Self::run_batch_until).
    pub async fn run_batch_timeout(&self, request: BatchRequest, timeout: Duration) -> BatchResult {
        self.run_batch_until(request, Instant::now() + timeout).await
    }

    /// Resolve a batch as a stream of `(key, result)` pairs.
    ///
    /// Items arrive in input order in sequential mode and in completion
    /// order in concurrent mode. Duplicate keys are resolved once. Dropping
    /// the stream cancels whatever has not resolved yet; items already
    /// yielded are unaffected.
    pub fn stream(&self, request: BatchRequest) -> BoxStream<'static, BatchItem> {
        let keys = request.unique_keys();
        let total = keys.len();
        let mode = request.batch.mode;
        let concurrency = request.batch.effective_concurrency();
        let sink: Arc<dyn ProgressSink> = if request.batch.show_progress {
            Arc::clone(&self.progress)
        } else {
            Arc::new(NoProgress)
        };
        let ctx = Arc::new(BatchContext {
            governor: RateGovernor::new(&request.batch.governor_config()),
            use_cache: request.batch.use_cache,
            options: request.options,
            connection: request.connection,
        });

        debug!(keys = total, ?mode, concurrency, "starting batch");

        let this = self.clone();
        let resolve = move |key: FetchKey| {
            let this = this.clone();
            let ctx = Arc::clone(&ctx);
            async move {
                let (outcome, source) = this
                    .resolve(
                        &key,
                        &ctx.options,
                        ctx.connection.as_ref(),
                        Some(&ctx.governor),
                        ctx.use_cache,
                    )
                    .await;
                let status = if outcome.is_ok() { "ok" } else { "error" };
                metrics::counter!(telemetry::BATCH_KEYS_TOTAL,
                    "status" => status,
                    "source" => source.as_str(),
                )
                .increment(1);
                (key, outcome)
            }
        };

        let resolved = match mode {
            ScheduleMode::Sequential => stream::iter(keys).then(resolve).boxed(),
            ScheduleMode::Concurrent => stream::iter(keys)
                .map(resolve)
                .buffer_unordered(concurrency)
                .boxed(),
        };

        let mut completed = 0;
        resolved
            .map(move |item| {
                completed += 1;
                sink.on_progress(completed, total);
                item
            })
            .boxed()
    }

    async fn resolve(
        &self,
        key: &FetchKey,
        options: &FetchOptions,
        connection: Option<&reqwest::Client>,
        batch_governor: Option<&RateGovernor>,
        use_cache: bool,
    ) -> (Result<Vec<TrendRecord>>, Source) {
        let fingerprint = Fingerprint::new(key, options);
        if use_cache && let Some(records) = self.cache.get(&fingerprint) {
            debug!(key = %key, count = records.len(), "served from cache");
            return (Ok(records), Source::Cache);
        }

        if let Err(e) = options.validate() {
            return (Err(e), Source::Fetch);
        }

        let _batch_permit = match batch_governor {
            Some(governor) => Some(governor.acquire().await),
            None => None,
        };
        let _shared_permit = match &self.governor {
            Some(governor) => Some(governor.acquire().await),
            None => None,
        };

        let fetcher = self.fetcher.name().to_owned();
        let started = Instant::now();
        let outcome = self.fetcher.fetch(key, options, connection).await;
        let elapsed = started.elapsed();
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "fetcher" => fetcher.clone())
            .record(elapsed.as_secs_f64());

        match &outcome {
            Ok(records) => {
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "fetcher" => fetcher,
                    "status" => "ok",
                )
                .increment(1);
                debug!(
                    key = %key,
                    count = records.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "fetched feed"
                );
                // Written even when the lookup was bypassed, so a forced
                // refresh also refreshes the cache.
                self.cache.put(fingerprint, records.clone());
            }
            Err(e) => {
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "fetcher" => fetcher,
                    "status" => "error",
                )
                .increment(1);
                warn!(key = %key, kind = %e.kind(), error = %e, "fetch failed");
            }
        }
        (outcome, Source::Fetch)
    }
}
