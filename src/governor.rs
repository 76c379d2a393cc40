//! Client-side rate control.
//!
//! [`RateGovernor`] combines two independent, optional knobs:
//!
//! - **Pacing**: a minimum wall-clock gap between successive call starts.
//!   Callers are queued on an async mutex and sleep until their slot.
//! - **Concurrency ceiling**: a semaphore bounding how many calls may be in
//!   flight at once. The slot is held by the returned [`GovernorPermit`]
//!   and released when it is dropped.
//!
//! The governor only ever delays; it has no failure mode. It is a
//! best-effort courtesy towards the remote service, not an enforcement of
//! its actual limits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::debug;

/// Configuration for a [`RateGovernor`].
///
/// ```rust
/// # use trendfeed::GovernorConfig;
/// # use std::time::Duration;
/// let config = GovernorConfig::new()
///     .delay(Duration::from_millis(100))
///     .max_concurrent(5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GovernorConfig {
    /// Minimum gap between call starts. Zero disables pacing.
    pub delay: Duration,
    /// Maximum calls in flight. `None` means unbounded.
    pub max_concurrent: Option<usize>,
}

impl GovernorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = Some(n);
        self
    }
}

/// Admission held for the duration of one outbound call.
///
/// Dropping it frees the concurrency slot, if one was taken.
#[derive(Debug)]
pub struct GovernorPermit {
    _slot: Option<OwnedSemaphorePermit>,
}

/// Pacing and concurrency gate placed in front of every outbound fetch.
#[derive(Debug)]
pub struct RateGovernor {
    delay: Duration,
    slots: Option<Arc<Semaphore>>,
    max_concurrent: Option<usize>,
    next_start: Mutex<Option<Instant>>,
}

impl RateGovernor {
    pub fn new(config: &GovernorConfig) -> Self {
        // A ceiling of zero would never admit anyone.
        let max_concurrent = config.max_concurrent.map(|n| n.max(1));
        Self {
            delay: config.delay,
            slots: max_concurrent.map(|n| Arc::new(Semaphore::new(n))),
            max_concurrent,
            next_start: Mutex::new(None),
        }
    }

    /// A governor that admits everyone immediately.
    pub fn unlimited() -> Self {
        Self::new(&GovernorConfig::default())
    }

    /// Wait for a concurrency slot, then for the pacing slot.
    pub async fn acquire(&self) -> GovernorPermit {
        let slot = match &self.slots {
            // The semaphore is never closed, so acquisition only waits.
            Some(slots) => slots.clone().acquire_owned().await.ok(),
            None => None,
        };
        self.wait().await;
        GovernorPermit { _slot: slot }
    }

    /// Apply pacing only: return once at least `delay` has passed since the
    /// previous call start.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        let mut next_start = self.next_start.lock().await;
        if let Some(at) = *next_start {
            let now = Instant::now();
            if at > now {
                debug!(wait_ms = (at - now).as_millis() as u64, "pacing outbound call");
                tokio::time::sleep_until(at).await;
            }
        }
        *next_start = Some(Instant::now() + self.delay);
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    /// Free concurrency slots right now, or `None` when unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.slots.as_ref().map(|s| s.available_permits())
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::unlimited()
    }
}
