//! Batch request and result types.

use std::collections::HashMap;
use std::time::Duration;

use crate::governor::GovernorConfig;
use crate::types::{FetchKey, FetchOptions, TrendRecord};
use crate::{Result, TrendsError};

/// Default number of concurrent fetches in a batch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// How a batch schedules its fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduleMode {
    /// One fetch at a time in input order, paced by `delay`.
    Sequential,
    /// Up to `concurrency` fetches in flight; completion order is arbitrary.
    #[default]
    Concurrent,
}

/// Per-call batch knobs.
///
/// ```rust
/// # use trendfeed::BatchOptions;
/// # use std::time::Duration;
/// let paced = BatchOptions::sequential(Duration::from_millis(100));
/// let fast = BatchOptions::concurrent(5).use_cache(false).show_progress(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub mode: ScheduleMode,
    /// Concurrency ceiling in concurrent mode. Default: 10.
    pub concurrency: usize,
    /// Minimum gap between outbound call starts. Default: none.
    pub delay: Duration,
    /// Consult the cache before fetching. Default: true.
    pub use_cache: bool,
    /// Forward progress to the orchestrator's sink. Default: false.
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Concurrent,
            concurrency: DEFAULT_CONCURRENCY,
            delay: Duration::ZERO,
            use_cache: true,
            show_progress: false,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential mode with `delay` between outbound calls.
    pub fn sequential(delay: Duration) -> Self {
        Self {
            mode: ScheduleMode::Sequential,
            delay,
            ..Self::default()
        }
    }

    /// Concurrent mode with at most `concurrency` fetches in flight.
    pub fn concurrent(concurrency: usize) -> Self {
        Self {
            mode: ScheduleMode::Concurrent,
            concurrency,
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Effective number of fetches allowed in flight.
    pub fn effective_concurrency(&self) -> usize {
        match self.mode {
            ScheduleMode::Sequential => 1,
            ScheduleMode::Concurrent => self.concurrency.max(1),
        }
    }

    /// The per-batch governor these options describe.
    pub fn governor_config(&self) -> GovernorConfig {
        GovernorConfig::new()
            .delay(self.delay)
            .max_concurrent(self.effective_concurrency())
    }
}

/// One batch invocation: keys, shared options, knobs, and an optional
/// shared connection.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub keys: Vec<FetchKey>,
    pub options: FetchOptions,
    pub batch: BatchOptions,
    /// Client shared by every fetch of the batch, for connection pooling.
    pub connection: Option<reqwest::Client>,
}

impl BatchRequest {
    pub fn new(keys: impl IntoIterator<Item = FetchKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            options: FetchOptions::default(),
            batch: BatchOptions::default(),
            connection: None,
        }
    }

    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn batch_options(mut self, batch: BatchOptions) -> Self {
        self.batch = batch;
        self
    }

    pub fn connection(mut self, client: reqwest::Client) -> Self {
        self.connection = Some(client);
        self
    }

    /// Keys in input order with duplicates removed.
    pub(crate) fn unique_keys(&self) -> Vec<FetchKey> {
        let mut seen = std::collections::HashSet::new();
        self.keys
            .iter()
            .filter(|k| seen.insert(*k))
            .cloned()
            .collect()
    }
}

/// Outcome of a batch: one entry per resolved key.
///
/// Every key carries either its records or the error that stopped it; a
/// failing key never hides its siblings. Keys cut off by a deadline are
/// listed in [`pending`](Self::pending) instead.
#[derive(Debug, Default)]
pub struct BatchResult {
    results: HashMap<FetchKey, Result<Vec<TrendRecord>>>,
    pending: Vec<FetchKey>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: FetchKey, result: Result<Vec<TrendRecord>>) {
        self.results.insert(key, result);
    }

    pub(crate) fn set_pending(&mut self, pending: Vec<FetchKey>) {
        self.pending = pending;
    }

    pub fn get(&self, key: &FetchKey) -> Option<&Result<Vec<TrendRecord>>> {
        self.results.get(key)
    }

    /// Records for `key`, if it resolved successfully.
    pub fn records(&self, key: &FetchKey) -> Option<&[TrendRecord]> {
        self.results.get(key)?.as_deref().ok()
    }

    /// Error for `key`, if it failed.
    pub fn error(&self, key: &FetchKey) -> Option<&TrendsError> {
        self.results.get(key)?.as_ref().err()
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.results.contains_key(key)
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keys that had not resolved when the batch was cut short.
    pub fn pending(&self) -> &[FetchKey] {
        &self.pending
    }

    /// Whether every requested key resolved.
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FetchKey> {
        self.results.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FetchKey, &Result<Vec<TrendRecord>>)> {
        self.results.iter()
    }

    pub fn successes(&self) -> impl Iterator<Item = (&FetchKey, &[TrendRecord])> {
        self.results
            .iter()
            .filter_map(|(k, r)| r.as_deref().ok().map(|records| (k, records)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FetchKey, &TrendsError)> {
        self.results
            .iter()
            .filter_map(|(k, r)| r.as_ref().err().map(|e| (k, e)))
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Successful keys only, dropping failures.
    pub fn into_records(self) -> HashMap<FetchKey, Vec<TrendRecord>> {
        self.results
            .into_iter()
            .filter_map(|(k, r)| r.ok().map(|records| (k, records)))
            .collect()
    }
}

impl IntoIterator for BatchResult {
    type Item = (FetchKey, Result<Vec<TrendRecord>>);
    type IntoIter = std::collections::hash_map::IntoIter<FetchKey, Result<Vec<TrendRecord>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl FromIterator<(FetchKey, Result<Vec<TrendRecord>>)> for BatchResult {
    fn from_iter<I: IntoIterator<Item = (FetchKey, Result<Vec<TrendRecord>>)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
            pending: Vec::new(),
        }
    }
}
