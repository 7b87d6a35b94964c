//! Time-boxed memoization for expensive external sources.
//!
//! Network fetches and subprocess spawns cost more than one sampling tick, so
//! each source keeps its last result (including failures) for a fixed TTL.

use parking_lot::Mutex;
use std::fmt::Display;
use std::time::{Duration, Instant};

/// Last fetch outcome. `value` is `None` when the fetch failed.
#[derive(Debug, Clone)]
struct CachedValue<T> {
    value: Option<T>,
    fetched_at: Instant,
}

/// Memoizes the result of a fallible fetch for `ttl`.
///
/// The entry lock is held across the fetch, so overlapping callers wait for an
/// in-flight fetch and then read its result instead of fetching again.
#[derive(Debug)]
pub struct ExternalSourceCache<T> {
    ttl: Duration,
    entry: Mutex<Option<CachedValue<T>>>,
}

impl<T: Clone> ExternalSourceCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the memoized value, refreshing it through `fetch` once the TTL has elapsed.
    pub fn get_or_fetch<F, E>(&self, fetch: F) -> Option<T>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: Display,
    {
        self.get_or_fetch_at(Instant::now(), fetch)
    }

    /// Same as [`get_or_fetch`](Self::get_or_fetch) with an explicit notion of "now".
    pub fn get_or_fetch_at<F, E>(&self, now: Instant, fetch: F) -> Option<T>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: Display,
    {
        let mut entry = self.entry.lock();

        if let Some(cached) = entry.as_ref() {
            if now.saturating_duration_since(cached.fetched_at) < self.ttl {
                return cached.value.clone();
            }
        }

        let value = match fetch() {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("External source fetch failed, caching absence: {}", e);
                None
            }
        };

        *entry = Some(CachedValue {
            value: value.clone(),
            fetched_at: now,
        });

        value
    }

    /// Peek at the memoized value without refreshing.
    pub fn last(&self) -> Option<T> {
        self.entry.lock().as_ref().and_then(|c| c.value.clone())
    }

    /// Forget the memoized value so the next access fetches.
    pub fn invalidate(&self) {
        *self.entry.lock() = None;
    }
}
