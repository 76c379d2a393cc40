//! Tests for the [`Trendfeed`] builder and [`TrendsGateway`] facade.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendfeed::{
    BatchOptions, BatchRequest, CacheConfig, ErrorKind, FetchKey, FetchOptions, GovernorConfig,
    ResponseCache, Trendfeed, TrendsError,
};

fn feed(title: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<rss xmlns:ht="https://trends.google.com/trending/rss" version="2.0">
  <channel>
    <item><title>{title}</title><ht:approx_traffic>500+</ht:approx_traffic></item>
  </channel>
</rss>"#
    )
}

async fn mount_feed(server: &MockServer, geo: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .and(query_param("geo", geo))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(title)))
        .mount(server)
        .await;
}

fn key(code: &str) -> FetchKey {
    FetchKey::new(code).unwrap()
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn builder_defaults() {
    let gateway = Trendfeed::builder().build().unwrap();
    let stats = gateway.cache_stats();
    assert_eq!(stats.max_size, 100);
    assert_eq!(stats.ttl, Duration::from_secs(300));
    assert_eq!(gateway.orchestrator().fetcher().name(), "rss");
}

#[test]
fn builder_applies_cache_config() {
    let gateway = Trendfeed::builder()
        .cache(CacheConfig::new().max_size(3).ttl(Duration::from_secs(10)))
        .build()
        .unwrap();
    let stats = gateway.cache_stats();
    assert_eq!(stats.max_size, 3);
    assert_eq!(stats.ttl, Duration::from_secs(10));
}

#[test]
fn builder_can_share_a_cache() {
    let cache = Arc::new(ResponseCache::new(&CacheConfig::new().max_size(7)));
    let a = Trendfeed::builder().shared_cache(cache.clone()).build().unwrap();
    let b = Trendfeed::builder().shared_cache(cache).build().unwrap();
    assert!(std::ptr::eq(a.cache(), b.cache()));
}

// ============================================================================
// Single fetch
// ============================================================================

#[tokio::test]
async fn fetch_uses_cache_on_second_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed("cached trend")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Trendfeed::builder().base_url(server.uri()).build().unwrap();
    let options = FetchOptions::default();

    let first = gateway.fetch(&key("US"), &options).await.unwrap();
    let second = gateway.fetch(&key("US"), &options).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].title, "cached trend");
    let stats = gateway.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn fetch_fresh_bypasses_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed("fresh")))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Trendfeed::builder().base_url(server.uri()).build().unwrap();
    let options = FetchOptions::default();

    gateway.fetch(&key("US"), &options).await.unwrap();
    gateway.fetch_fresh(&key("US"), &options).await.unwrap();

    assert_eq!(gateway.cache().len(), 1);
}

#[tokio::test]
async fn fetch_propagates_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let gateway = Trendfeed::builder().base_url(server.uri()).build().unwrap();
    let err = gateway
        .fetch(&key("US"), &FetchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err, TrendsError::RateLimited { retry_after: None });
}

#[tokio::test]
async fn disabled_cache_always_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed("x")))
        .expect(3)
        .mount(&server)
        .await;

    let gateway = Trendfeed::builder()
        .base_url(server.uri())
        .disable_cache()
        .build()
        .unwrap();
    for _ in 0..3 {
        gateway.fetch(&key("US"), &FetchOptions::default()).await.unwrap();
    }

    assert!(gateway.cache().is_empty());
}

// ============================================================================
// Batches
// ============================================================================

#[tokio::test]
async fn fetch_batch_isolates_failures() {
    let server = MockServer::start().await;
    mount_feed(&server, "US", "us trend").await;
    mount_feed(&server, "DE", "de trend").await;
    Mock::given(method("GET"))
        .and(query_param("geo", "GB"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = Trendfeed::builder()
        .base_url(server.uri())
        .governor(GovernorConfig::new().max_concurrent(2))
        .build()
        .unwrap();
    let keys = vec![key("US"), key("GB"), key("DE")];

    let result = gateway.fetch_batch(&keys, &FetchOptions::default()).await;

    assert_eq!(result.len(), 3);
    assert_eq!(result.records(&key("US")).unwrap()[0].title, "us trend");
    assert_eq!(result.records(&key("DE")).unwrap()[0].title, "de trend");
    assert_eq!(result.error(&key("GB")).unwrap().kind(), ErrorKind::Network);
}

#[tokio::test]
async fn run_batch_with_shared_connection() {
    let server = MockServer::start().await;
    mount_feed(&server, "US", "us").await;
    mount_feed(&server, "JP", "jp").await;

    let gateway = Trendfeed::builder().base_url(server.uri()).build().unwrap();
    let request = BatchRequest::new([key("US"), key("JP")])
        .batch_options(BatchOptions::sequential(Duration::from_millis(10)))
        .connection(reqwest::Client::new());

    let result = gateway.run_batch(request).await;

    assert_eq!(result.success_count(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn cache_management_operations() {
    let server = MockServer::start().await;
    mount_feed(&server, "US", "us").await;

    let gateway = Trendfeed::builder().base_url(server.uri()).build().unwrap();
    gateway.fetch(&key("US"), &FetchOptions::default()).await.unwrap();
    assert_eq!(gateway.cache_stats().size, 1);

    gateway.set_cache_ttl(Duration::from_secs(5));
    assert_eq!(gateway.cache_stats().ttl, Duration::from_secs(5));

    gateway.clear_cache();
    let stats = gateway.cache_stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.misses, 0);
}

#[test]
fn batch_defaults_are_kept() {
    let gateway = Trendfeed::builder()
        .batch_defaults(BatchOptions::concurrent(3))
        .build()
        .unwrap();
    assert_eq!(gateway.batch_defaults().concurrency, 3);
}
