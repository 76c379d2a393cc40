//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::TrendsGateway;
use crate::Result;
use crate::batch::{BatchOptions, BatchOrchestrator, ProgressSink};
use crate::cache::{CacheConfig, ResponseCache};
use crate::fetch::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RssFetcher, TrendsFetcher, build_client};
use crate::governor::{GovernorConfig, RateGovernor};

/// Main entry point for creating gateway instances.
pub struct Trendfeed;

impl Trendfeed {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> TrendfeedBuilder {
        TrendfeedBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// ```rust
/// # use trendfeed::{CacheConfig, Trendfeed};
/// # use std::time::Duration;
/// # fn main() -> trendfeed::Result<()> {
/// let gateway = Trendfeed::builder()
///     .cache(CacheConfig::new().ttl(Duration::from_secs(600)))
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TrendfeedBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    fetcher: Option<Arc<dyn TrendsFetcher>>,
    cache_config: CacheConfig,
    shared_cache: Option<Arc<ResponseCache>>,
    governor: Option<GovernorConfig>,
    progress: Option<Arc<dyn ProgressSink>>,
    batch_defaults: BatchOptions,
}

impl TrendfeedBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            fetcher: None,
            cache_config: CacheConfig::default(),
            shared_cache: None,
            governor: None,
            progress: None,
            batch_defaults: BatchOptions::default(),
        }
    }

    /// Point the RSS fetcher at a different host (e.g. a wiremock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout of the RSS fetcher (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom fetcher instead of the RSS transport.
    ///
    /// `base_url` and `timeout` are ignored when a fetcher is supplied.
    pub fn fetcher(mut self, fetcher: Arc<dyn TrendsFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Configure the response cache created by `build()`.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Reuse an existing cache instead of creating one.
    pub fn shared_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    /// Disable caching (TTL of zero).
    pub fn disable_cache(mut self) -> Self {
        self.cache_config = CacheConfig::disabled();
        self
    }

    /// Gate every outbound call, across batches, on one governor.
    pub fn governor(mut self, config: GovernorConfig) -> Self {
        self.governor = Some(config);
        self
    }

    /// Sink for batches that ask for progress.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Defaults used by [`TrendsGateway::fetch_batch`].
    pub fn batch_defaults(mut self, options: BatchOptions) -> Self {
        self.batch_defaults = options;
        self
    }

    pub fn build(self) -> Result<TrendsGateway> {
        let fetcher: Arc<dyn TrendsFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => {
                let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
                let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
                let http = build_client(timeout)?;
                Arc::new(RssFetcher::with_client(http, base_url).timeout(timeout))
            }
        };

        let cache = self
            .shared_cache
            .unwrap_or_else(|| Arc::new(ResponseCache::new(&self.cache_config)));

        let mut orchestrator = BatchOrchestrator::new(fetcher, cache);
        if let Some(config) = &self.governor {
            orchestrator = orchestrator.with_governor(Arc::new(RateGovernor::new(config)));
        }
        if let Some(sink) = self.progress {
            orchestrator = orchestrator.with_progress(sink);
        }

        Ok(TrendsGateway::new(orchestrator, self.batch_defaults))
    }
}

impl Default for TrendfeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}
