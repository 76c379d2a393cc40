//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `trendfeed_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `fetcher`: fetcher name (e.g. "rss")
//! - `status`: outcome: "ok" or "error"
//! - `source`: where a batch key was resolved from: "cache" or "fetch"

/// Outbound fetches performed (cache hits are not counted).
///
/// Labels: `fetcher`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "trendfeed_requests_total";

/// Outbound fetch duration in seconds, excluding time spent in the governor.
///
/// Labels: `fetcher`.
pub const REQUEST_DURATION_SECONDS: &str = "trendfeed_request_duration_seconds";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "trendfeed_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "trendfeed_cache_misses_total";

/// Keys resolved by batch runs.
///
/// Labels: `status` ("ok" | "error"), `source` ("cache" | "fetch").
pub const BATCH_KEYS_TOTAL: &str = "trendfeed_batch_keys_total";
