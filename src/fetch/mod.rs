//! Feed retrieval: the fetcher trait, the RSS transport, and its parser.

pub mod parse;
pub mod rss;
pub mod traits;

pub use parse::parse_feed;
pub use rss::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RssFetcher, build_client};
pub use traits::TrendsFetcher;
