//! Counter-to-rate conversion for cumulative hardware counters.
//!
//! Disk and network throughput are both derived by differencing successive
//! reads of a cumulative byte counter.

use std::time::Instant;

/// Previous cumulative total and when it was read.
#[derive(Debug, Clone, Copy)]
struct RateState {
    total: u64,
    at: Instant,
}

/// Converts a cumulative counter into a per-second rate.
///
/// The first call only records a baseline and returns 0, so owners call
/// [`RateSampler::sample`] once at construction before the first real tick.
#[derive(Debug, Default)]
pub struct RateSampler {
    previous: Option<RateState>,
}

impl RateSampler {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Read the counter now and return the rate since the previous read.
    pub fn sample<F>(&mut self, read_cumulative: F) -> u64
    where
        F: FnOnce() -> u64,
    {
        let total = read_cumulative();
        self.sample_at(total, Instant::now())
    }

    /// Record `total` as observed at `at` and return units per second since the previous read.
    ///
    /// A counter that went backwards (reset or wraparound) yields 0 for this
    /// interval; the new value still becomes the baseline.
    pub fn sample_at(&mut self, total: u64, at: Instant) -> u64 {
        let rate = match self.previous {
            None => 0,
            Some(prev) => {
                let elapsed_ms = at.saturating_duration_since(prev.at).as_millis().max(1);
                let delta = total.saturating_sub(prev.total) as u128;
                (delta * 1000 / elapsed_ms).min(u64::MAX as u128) as u64
            }
        };

        self.previous = Some(RateState { total, at });
        rate
    }

    /// Whether a baseline has been recorded.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }
}
