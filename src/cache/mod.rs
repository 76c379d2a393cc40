//! Caching subsystem.
//!
//! [`ResponseCache`] is an explicitly constructed, injectable LRU + TTL store
//! of fetched feeds keyed on a [`Fingerprint`] of `(region, options)`. There
//! is no module-level singleton: callers own the instance and share it via
//! `Arc` (typically one per process, one per test).

pub mod response;

pub use response::{
    CacheConfig, CacheEntry, CacheStats, DEFAULT_MAX_SIZE, DEFAULT_TTL, Fingerprint,
    ResponseCache,
};
