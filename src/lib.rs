//! Trendfeed - concurrent, cached batch fetching of trending-search feeds
//!
//! This crate fetches the Google Trends "trending now" RSS feed for one or
//! many regions. Batches run with bounded concurrency and optional pacing,
//! share a TTL-bounded LRU response cache, and report per-region failures
//! without aborting the rest of the batch.
//!
//! # Single Region
//!
//! ```rust,no_run
//! use trendfeed::{FetchKey, FetchOptions, Trendfeed};
//!
//! #[tokio::main]
//! async fn main() -> trendfeed::Result<()> {
//!     let gateway = Trendfeed::builder().build()?;
//!
//!     let key = FetchKey::new("US")?;
//!     let trends = gateway.fetch(&key, &FetchOptions::default()).await?;
//!
//!     for trend in &trends {
//!         println!("{}. {}", trend.rank, trend.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Batch
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use trendfeed::{BatchOptions, BatchRequest, FetchKey, Trendfeed};
//!
//! #[tokio::main]
//! async fn main() -> trendfeed::Result<()> {
//!     let gateway = Trendfeed::builder().build()?;
//!
//!     let request = BatchRequest::new(FetchKey::parse_all(["US", "GB", "DE", "JP"])?)
//!         .batch_options(BatchOptions::concurrent(2).delay(Duration::from_millis(250)));
//!
//!     let result = gateway.run_batch(request).await;
//!     for (key, error) in result.failures() {
//!         eprintln!("{key}: {error}");
//!     }
//!     println!("{} regions fetched", result.success_count());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod governor;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{ErrorKind, Result, TrendsError};
pub use gateway::{Trendfeed, TrendfeedBuilder, TrendsGateway};
pub use version::{PKG_VERSION, user_agent};

pub use batch::{
    BatchItem, BatchOptions, BatchOrchestrator, BatchRequest, BatchResult, LogProgress,
    NoProgress, ProgressSink, ScheduleMode, WriterProgress,
};
pub use cache::{CacheConfig, CacheStats, Fingerprint, ResponseCache};
pub use fetch::{RssFetcher, TrendsFetcher, parse_feed};
pub use governor::{GovernorConfig, GovernorPermit, RateGovernor};

// Re-export all types
pub use types::{Category, FetchKey, FetchOptions, NewsItem, TimeWindow, TrendRecord};
