//! Progress reporting for batch runs.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::{info, warn};

/// Receives `(completed, total)` after each key of a batch resolves.
///
/// Called in completion order. Implementations must be cheap; they run inline
/// with the batch.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Discards all progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Reports progress through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            completed * 100 / total
        };
        info!(completed, total, percent, "fetching trends");
    }
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Writes `fetched completed/total (percent%)` lines to a writer.
///
/// Used by the CLI to show progress on stderr independently of the log
/// filter. Write failures are logged and otherwise ignored.
pub struct WriterProgress<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> ProgressSink for WriterProgress<W> {
    fn on_progress(&self, completed: usize, total: usize) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let percent = if total == 0 {
            100
        } else {
            completed * 100 / total
        };
        if let Err(e) = writeln!(out, "fetched {completed}/{total} ({percent}%)") {
            warn!(error = %e, "failed to write progress");
        }
    }
}
