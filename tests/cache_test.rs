//! Tests for [`ResponseCache`]: bounded LRU + TTL cache of fetched feeds.
//!
//! Timing runs on tokio's paused clock, so expiry is deterministic.

use std::time::Duration;

use trendfeed::cache::{CacheConfig, Fingerprint, ResponseCache};
use trendfeed::types::{Category, FetchKey, FetchOptions, TrendRecord};

fn key(code: &str) -> FetchKey {
    FetchKey::new(code).unwrap()
}

fn fp(code: &str) -> Fingerprint {
    Fingerprint::new(&key(code), &FetchOptions::default())
}

fn records(title: &str) -> Vec<TrendRecord> {
    vec![TrendRecord::new(title, 1).traffic("1000+")]
}

fn cache(max_size: usize, ttl_secs: u64) -> ResponseCache {
    ResponseCache::new(
        &CacheConfig::new()
            .max_size(max_size)
            .ttl(Duration::from_secs(ttl_secs)),
    )
}

// =========================================================================
// CacheConfig
// =========================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.max_size, 100);
    assert_eq!(config.ttl, Duration::from_secs(300));
}

#[test]
fn cache_config_builder() {
    let config = CacheConfig::new().max_size(5).ttl(Duration::from_secs(60));
    assert_eq!(config.max_size, 5);
    assert_eq!(config.ttl, Duration::from_secs(60));
    assert_eq!(CacheConfig::disabled().ttl, Duration::ZERO);
}

// =========================================================================
// Fingerprints
// =========================================================================

#[test]
fn fingerprint_depends_on_key_and_options() {
    let us = key("US");
    let defaults = FetchOptions::default();
    let sports = FetchOptions::new().category(Category::Sports);

    assert_eq!(Fingerprint::new(&us, &defaults), Fingerprint::new(&us, &defaults));
    assert_ne!(Fingerprint::new(&us, &defaults), Fingerprint::new(&us, &sports));
    assert_ne!(
        Fingerprint::new(&us, &defaults),
        Fingerprint::new(&key("GB"), &defaults)
    );
}

#[test]
fn fingerprint_ignores_key_case() {
    let options = FetchOptions::default();
    assert_eq!(
        Fingerprint::new(&key("us-ca"), &options),
        Fingerprint::new(&key("US-CA"), &options)
    );
}

// =========================================================================
// Hits, misses and expiry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn put_then_get_within_ttl_hits() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("a"));

    tokio::time::advance(Duration::from_secs(59)).await;

    assert_eq!(cache.get(&fp("US")), Some(records("a")));
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 0);
}

#[tokio::test(start_paused = true)]
async fn entry_expires_after_ttl() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("a"));

    tokio::time::advance(Duration::from_secs(60)).await;

    assert!(cache.get(&fp("US")).is_none());
    assert_eq!(cache.stats().misses, 1);
    // Stale entries are dropped on read.
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn overwrite_restarts_the_clock() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("old"));
    tokio::time::advance(Duration::from_secs(50)).await;
    cache.put(fp("US"), records("new"));
    tokio::time::advance(Duration::from_secs(50)).await;

    assert_eq!(cache.get(&fp("US")), Some(records("new")));
    assert_eq!(cache.len(), 1);
}

#[test]
fn absent_key_is_a_miss() {
    let cache = ResponseCache::default();
    assert!(cache.get(&fp("US")).is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn zero_ttl_disables_caching() {
    let cache = ResponseCache::new(&CacheConfig::disabled());
    cache.put(fp("US"), records("a"));

    assert!(cache.is_empty());
    assert!(cache.get(&fp("US")).is_none());
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn zero_max_size_stores_nothing() {
    let cache = cache(0, 60);
    cache.put(fp("US"), records("a"));
    assert!(cache.is_empty());
    assert!(cache.get(&fp("US")).is_none());
}

#[tokio::test(start_paused = true)]
async fn set_ttl_moves_the_threshold_for_existing_entries() {
    let cache = cache(10, 300);
    cache.put(fp("US"), records("a"));
    tokio::time::advance(Duration::from_secs(120)).await;

    cache.set_ttl(Duration::from_secs(60));
    assert_eq!(cache.ttl(), Duration::from_secs(60));
    assert!(cache.get(&fp("US")).is_none());

    cache.put(fp("GB"), records("b"));
    cache.set_ttl(Duration::from_secs(600));
    tokio::time::advance(Duration::from_secs(400)).await;
    assert!(cache.get(&fp("GB")).is_some());
}

#[test]
fn contains_does_not_touch_counters() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("a"));

    assert!(cache.contains(&fp("US")));
    assert!(!cache.contains(&fp("GB")));
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 0);
}

// =========================================================================
// Eviction
// =========================================================================

#[test]
fn eviction_keeps_max_size_and_drops_oldest() {
    let codes = ["AA", "AB", "AC", "AD", "AE", "AF", "AG"];
    let cache = cache(4, 300);
    for code in codes {
        cache.put(fp(code), records(code));
    }

    assert_eq!(cache.len(), 4);
    // The k = 3 oldest insertions are gone.
    for code in &codes[..3] {
        assert!(!cache.contains(&fp(code)), "{code} should be evicted");
    }
    for code in &codes[3..] {
        assert!(cache.contains(&fp(code)), "{code} should remain");
    }
}

#[test]
fn get_refreshes_recency() {
    let cache = cache(2, 300);
    cache.put(fp("US"), records("us"));
    cache.put(fp("GB"), records("gb"));

    // Touch US so GB becomes least recently used.
    assert!(cache.get(&fp("US")).is_some());
    cache.put(fp("DE"), records("de"));

    assert!(cache.contains(&fp("US")));
    assert!(!cache.contains(&fp("GB")));
    assert!(cache.contains(&fp("DE")));
}

#[test]
fn put_refreshes_recency() {
    let cache = cache(2, 300);
    cache.put(fp("US"), records("us"));
    cache.put(fp("GB"), records("gb"));
    cache.put(fp("US"), records("us2"));
    cache.put(fp("DE"), records("de"));

    assert!(cache.contains(&fp("US")));
    assert!(!cache.contains(&fp("GB")));
}

// =========================================================================
// Stats and clear
// =========================================================================

#[test]
fn stats_report_hit_rate() {
    let cache = cache(10, 60);
    assert_eq!(cache.stats().hit_rate, 0.0);

    cache.put(fp("US"), records("a"));
    cache.get(&fp("US"));
    cache.get(&fp("US"));
    cache.get(&fp("US"));
    cache.get(&fp("GB"));

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
    assert_eq!(stats.max_size, 10);
    assert_eq!(stats.ttl, Duration::from_secs(60));
    assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
}

#[test]
fn clear_empties_and_resets_counters() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("a"));
    cache.get(&fp("US"));
    cache.get(&fp("GB"));

    cache.clear();

    let stats = cache.stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert!(cache.get(&fp("US")).is_none());
}

#[test]
fn clear_is_idempotent() {
    let cache = cache(10, 60);
    cache.put(fp("US"), records("a"));
    cache.clear();
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn cache_is_shareable_across_threads() {
    use std::sync::Arc;

    let cache = Arc::new(cache(100, 60));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                let code = format!("A{}", (b'A' + i as u8) as char);
                cache.put(fp(&code), records(&code));
                cache.get(&fp(&code))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_some());
    }
    assert_eq!(cache.len(), 4);
}
