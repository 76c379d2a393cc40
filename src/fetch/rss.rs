//! RSS transport for the public trending feed.
//!
//! Issues `GET {base_url}/trending/rss?geo=<KEY>` plus the option query
//! parameters, maps the response status onto [`TrendsError`], and hands the
//! body to [`parse_feed`](super::parse_feed).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::parse::parse_feed;
use super::traits::TrendsFetcher;
use crate::types::{FetchKey, FetchOptions, TrendRecord};
use crate::{Result, TrendsError};

/// Default base URL of the trends service.
pub const DEFAULT_BASE_URL: &str = "https://trends.google.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in an [`TrendsError::Http`] message.
const MAX_ERROR_BODY: usize = 200;

/// Fetcher for the trending RSS feed.
///
/// Holds its own pooled [`Client`]; pass a different one per call via the
/// `connection` argument of [`TrendsFetcher::fetch`] to share a pool across
/// fetchers. The request timeout belongs to the fetcher and applies to
/// whichever client sends the request.
#[derive(Clone)]
pub struct RssFetcher {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RssFetcher {
    /// Create a fetcher for the public service.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a fetcher with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(build_client(DEFAULT_TIMEOUT)?, base_url))
    }

    /// Create a fetcher with a custom base URL and request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?, base_url).timeout(timeout))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request timeout, also applied to shared connections (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The fetcher's own client, e.g. to share as a batch connection.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn feed_url(&self) -> String {
        format!("{}/trending/rss", self.base_url)
    }
}

/// Build a pooled HTTP client with the crate's user agent.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(crate::version::user_agent())
        .build()
        .map_err(|e| TrendsError::Configuration(format!("failed to build HTTP client: {e}")))
}

#[async_trait]
impl TrendsFetcher for RssFetcher {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch(
        &self,
        key: &FetchKey,
        options: &FetchOptions,
        connection: Option<&Client>,
    ) -> Result<Vec<TrendRecord>> {
        options.validate()?;

        let http = connection.unwrap_or(&self.http);
        let response = http
            .get(self.feed_url())
            .query(&[("geo", key.as_str())])
            .query(&options.query_pairs())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TrendsError::RateLimited {
                retry_after: retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendsError::Http {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let body = response.text().await?;
        let records = parse_feed(&body)?;
        debug!(key = %key, count = records.len(), "parsed trending feed");
        Ok(records)
    }
}

/// Parse a `Retry-After` header given in seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
