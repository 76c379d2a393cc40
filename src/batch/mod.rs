//! Batch fetching: many keys, one call.
//!
//! [`BatchOrchestrator`] resolves a [`BatchRequest`] into a [`BatchResult`]
//! through the response cache and rate governor, isolating per-key failures.

pub mod orchestrator;
pub mod progress;
pub mod result;

pub use orchestrator::{BatchItem, BatchOrchestrator};
pub use progress::{LogProgress, NoProgress, ProgressSink, WriterProgress};
pub use result::{BatchOptions, BatchRequest, BatchResult, DEFAULT_CONCURRENCY, ScheduleMode};
