//! Gateway: the assembled fetcher, cache and governor behind one handle.

mod builder;
mod client;

pub use builder::{Trendfeed, TrendfeedBuilder};
pub use client::TrendsGateway;
