//! Public types for the Trendfeed API.

mod key;
mod options;
mod record;

pub use key::FetchKey;
pub use options::{Category, FetchOptions, TimeWindow};
pub use record::{NewsItem, TrendRecord};
