//! Response cache for fetched feeds.
//!
//! [`ResponseCache`] sits in front of the
//! [`TrendsFetcher`](crate::fetch::TrendsFetcher): the
//! [`BatchOrchestrator`](crate::batch::BatchOrchestrator) reads it before
//! every fetch and writes successful results back. The fetcher itself never
//! touches the cache.
//!
//! # Semantics
//!
//! - An entry is fresh while `now - inserted_at < ttl`. Stale entries are
//!   dropped when read.
//! - A TTL of zero disables caching: every `get` is a miss and `put` stores
//!   nothing.
//! - Capacity is bounded by `max_size`. Eviction is strict LRU: both a hit
//!   and a `put` mark an entry as most recently used, and the least recently
//!   used entry is evicted first.
//! - Hit/miss counters accumulate for the lifetime of the cache and are reset
//!   only by [`ResponseCache::clear`].
//!
//! Timestamps use [`tokio::time::Instant`], so tests can drive expiry with a
//! paused runtime clock.
//!
//! # Concurrency
//!
//! All state lives behind one mutex which is never held across an await. A
//! poisoned lock degrades to "miss" on read and "skip" on write rather than
//! failing the fetch.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::telemetry;
use crate::types::{FetchKey, FetchOptions, TrendRecord};

/// Default time-to-live: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity in entries.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Configuration for the response cache.
///
/// ```rust
/// # use trendfeed::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_size(500)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 100.
    pub max_size: usize,
    /// Time-to-live for cached entries. Zero disables caching. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_size(mut self, n: usize) -> Self {
        self.max_size = n;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// A config with caching turned off.
    pub fn disabled() -> Self {
        Self::default().ttl(Duration::ZERO)
    }
}

/// Cache key: a region key and the options that shape the request.
///
/// Holds both values exactly, so distinct requests never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    key: FetchKey,
    options: FetchOptions,
}

impl Fingerprint {
    pub fn new(key: &FetchKey, options: &FetchOptions) -> Self {
        Self {
            key: key.clone(),
            options: options.clone(),
        }
    }

    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }
}

/// A stored feed and the moment it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<TrendRecord>,
    pub inserted_at: Instant,
}

impl CacheEntry {
    /// Whether the entry is still valid under `ttl` at `now`.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub max_size: usize,
    /// `hits / (hits + misses)`, or 0 when nothing was looked up yet.
    pub hit_rate: f64,
    pub ttl: Duration,
}

struct CacheState {
    entries: LruCache<Fingerprint, CacheEntry>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

/// Bounded LRU + TTL cache of fetched feeds.
///
/// Construct one per process (or per test) and share it via `Arc`.
pub struct ResponseCache {
    state: Mutex<CacheState>,
    max_size: usize,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        // LruCache needs a non-zero capacity; a zero max_size is enforced in put().
        let capacity = NonZeroUsize::new(config.max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                ttl: config.ttl,
                hits: 0,
                misses: 0,
            }),
            max_size: config.max_size,
        }
    }

    /// Look up a fresh entry.
    ///
    /// Returns `None` when the entry is absent, stale, or caching is disabled.
    /// Counts a hit or a miss either way.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Vec<TrendRecord>> {
        let Ok(mut state) = self.state.lock() else {
            warn!("response cache lock poisoned, treating lookup as miss");
            return None;
        };

        let ttl = state.ttl;
        let now = Instant::now();
        let lookup = if ttl.is_zero() {
            None
        } else {
            state
                .entries
                .get(fingerprint)
                .map(|entry| entry.is_fresh(ttl, now).then(|| entry.value.clone()))
        };

        match lookup {
            Some(Some(value)) => {
                state.hits += 1;
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(value)
            }
            stale_or_absent => {
                if stale_or_absent.is_some() {
                    state.entries.pop(fingerprint);
                    debug!(key = %fingerprint.key, "dropped stale cache entry");
                }
                state.misses += 1;
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert or overwrite an entry, evicting the least recently used ones
    /// beyond `max_size`. No-op when caching is disabled.
    pub fn put(&self, fingerprint: Fingerprint, value: Vec<TrendRecord>) {
        if self.max_size == 0 {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            warn!("response cache lock poisoned, skipping store");
            return;
        };
        if state.ttl.is_zero() {
            return;
        }

        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        if let Some((evicted, _)) = state.entries.push(fingerprint.clone(), entry)
            && evicted != fingerprint
        {
            debug!(key = %evicted.key, "evicted least recently used cache entry");
        }
    }

    /// Whether a fresh entry exists, without touching recency or counters.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        let Ok(state) = self.state.lock() else {
            return false;
        };
        let now = Instant::now();
        state
            .entries
            .peek(fingerprint)
            .is_some_and(|entry| !state.ttl.is_zero() && entry.is_fresh(state.ttl, now))
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn clear(&self) {
        match self.state.lock() {
            Ok(mut state) => {
                state.entries.clear();
                state.hits = 0;
                state.misses = 0;
            }
            Err(poisoned) => {
                // Rebuild from scratch; clearing is the recovery path.
                let mut state = poisoned.into_inner();
                state.entries.clear();
                state.hits = 0;
                state.misses = 0;
                self.state.clear_poison();
            }
        }
    }

    /// Change the TTL used by future lookups and stores.
    ///
    /// Stored timestamps are untouched; only the freshness threshold moves.
    pub fn set_ttl(&self, ttl: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.ttl = ttl;
        }
    }

    pub fn ttl(&self) -> Duration {
        self.state.lock().map(|s| s.ttl).unwrap_or(Duration::ZERO)
    }

    pub fn stats(&self) -> CacheStats {
        let (hits, misses, size, ttl) = match self.state.lock() {
            Ok(s) => (s.hits, s.misses, s.entries.len(), s.ttl),
            Err(_) => (0, 0, 0, Duration::ZERO),
        };
        let lookups = hits + misses;
        CacheStats {
            hits,
            misses,
            size,
            max_size: self.max_size,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            ttl,
        }
    }

    /// Number of stored entries, including ones that have gone stale but
    /// have not been read since.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
