//! TrendsGateway - single and batch fetches over a shared cache

use std::time::Duration;

use futures_util::stream::BoxStream;

use crate::Result;
use crate::batch::{BatchItem, BatchOptions, BatchOrchestrator, BatchRequest, BatchResult};
use crate::cache::{CacheStats, ResponseCache};
use crate::types::{FetchKey, FetchOptions, TrendRecord};

/// Handle combining a fetcher, a response cache and rate control.
///
/// Built with [`Trendfeed::builder()`](super::Trendfeed::builder). Cheap to
/// clone; clones share the cache.
#[derive(Clone)]
pub struct TrendsGateway {
    orchestrator: BatchOrchestrator,
    batch_defaults: BatchOptions,
}

impl TrendsGateway {
    pub(crate) fn new(orchestrator: BatchOrchestrator, batch_defaults: BatchOptions) -> Self {
        Self {
            orchestrator,
            batch_defaults,
        }
    }

    /// Fetch one region through the cache.
    pub async fn fetch(&self, key: &FetchKey, options: &FetchOptions) -> Result<Vec<TrendRecord>> {
        self.orchestrator.fetch_one(key, options, true).await
    }

    /// Fetch one region, bypassing the cache lookup (the result is still stored).
    pub async fn fetch_fresh(
        &self,
        key: &FetchKey,
        options: &FetchOptions,
    ) -> Result<Vec<TrendRecord>> {
        self.orchestrator.fetch_one(key, options, false).await
    }

    /// Fetch many regions with the gateway's default batch options.
    pub async fn fetch_batch(&self, keys: &[FetchKey], options: &FetchOptions) -> BatchResult {
        let request = BatchRequest::new(keys.iter().cloned())
            .options(options.clone())
            .batch_options(self.batch_defaults.clone());
        self.orchestrator.run_batch(request).await
    }

    /// Run a fully specified batch.
    pub async fn run_batch(&self, request: BatchRequest) -> BatchResult {
        self.orchestrator.run_batch(request).await
    }

    /// Run a batch for at most `timeout`, keeping whatever resolved.
    pub async fn run_batch_timeout(&self, request: BatchRequest, timeout: Duration) -> BatchResult {
        self.orchestrator.run_batch_timeout(request, timeout).await
    }

    /// Stream a batch as keys resolve.
    pub fn stream_batch(&self, request: BatchRequest) -> BoxStream<'static, BatchItem> {
        self.orchestrator.stream(request)
    }

    pub fn cache(&self) -> &ResponseCache {
        self.orchestrator.cache()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    pub fn set_cache_ttl(&self, ttl: Duration) {
        self.cache().set_ttl(ttl);
    }

    pub fn batch_defaults(&self) -> &BatchOptions {
        &self.batch_defaults
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }
}
