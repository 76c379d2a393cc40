//! Fetcher trait.
//!
//! A fetcher performs one logical retrieval for one region key and returns
//! the parsed records. It knows nothing about caching or pacing; the
//! [`BatchOrchestrator`](crate::batch::BatchOrchestrator) composes those
//! around it.
//!
//! # Shared connections
//!
//! `fetch` receives an optional [`reqwest::Client`]. When present the fetcher
//! must send through it instead of its own client, so that concurrent
//! fetches share one connection pool. `reqwest::Client` is internally
//! reference-counted and safe to use from many tasks at once.
//!
//! # Example
//!
//! ```ignore
//! struct Fixed(Vec<TrendRecord>);
//!
//! #[async_trait]
//! impl TrendsFetcher for Fixed {
//!     fn name(&self) -> &str { "fixed" }
//!
//!     async fn fetch(
//!         &self,
//!         _key: &FetchKey,
//!         _options: &FetchOptions,
//!         _connection: Option<&reqwest::Client>,
//!     ) -> Result<Vec<TrendRecord>> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{FetchKey, FetchOptions, TrendRecord};

/// One retrieval of one feed.
#[async_trait]
pub trait TrendsFetcher: Send + Sync {
    /// Fetcher name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch and parse the feed for `key`.
    ///
    /// Fails with a network, parse, or rate-limit error. Invalid options are
    /// rejected before any request is made.
    async fn fetch(
        &self,
        key: &FetchKey,
        options: &FetchOptions,
        connection: Option<&reqwest::Client>,
    ) -> Result<Vec<TrendRecord>>;
}
