//! Minimum-interval guard for network refreshes

use std::time::{Duration, Instant};

/// Skips calls that arrive within `min_interval` of the last completed run
///
/// Only completed runs are recorded, so a call that failed hard can be
/// retried on the next update.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_run: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_run: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Whether a run is allowed at `now`
    pub fn is_ready_at(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.min_interval,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready_at(Instant::now())
    }

    /// Record a completed run at `now`
    pub fn mark_at(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    pub fn mark(&mut self) {
        self.mark_at(Instant::now());
    }

    /// Forget the last run so the next call goes through
    pub fn reset(&mut self) {
        self.last_run = None;
    }
}
