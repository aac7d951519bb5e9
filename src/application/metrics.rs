//! Observability metrics for throttling.
//!
//! Process-local counters describing what the engine has decided. For
//! multi-process deployments each process reports its own share; aggregate
//! downstream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for throttle decisions and storage health.
///
/// All counters use atomic operations for thread-safe updates and reads.
/// Clones share the same counters, so a `Throttle` and its clones report as
/// one.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Requests admitted within their window limit
    requests_allowed: AtomicU64,
    /// Requests denied for exceeding their window limit
    requests_limited: AtomicU64,
    /// Requests blocked by a blacklist mark
    blacklist_hits: AtomicU64,
    /// Decisions that failed with a storage error
    storage_errors: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_allowed: AtomicU64::new(0),
                requests_limited: AtomicU64::new(0),
                blacklist_hits: AtomicU64::new(0),
                storage_errors: AtomicU64::new(0),
            }),
        }
    }

    /// Record an admitted request.
    pub(crate) fn record_allowed(&self) {
        self.inner.requests_allowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rate-limited denial.
    pub(crate) fn record_limited(&self) {
        self.inner.requests_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request blocked by the blacklist.
    pub(crate) fn record_blacklist_hit(&self) {
        self.inner.blacklist_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decision that failed on storage.
    pub(crate) fn record_storage_error(&self) {
        self.inner.storage_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of admitted requests.
    pub fn requests_allowed(&self) -> u64 {
        self.inner.requests_allowed.load(Ordering::Relaxed)
    }

    /// Get the total number of rate-limited denials.
    pub fn requests_limited(&self) -> u64 {
        self.inner.requests_limited.load(Ordering::Relaxed)
    }

    /// Get the total number of blacklist-blocked requests.
    pub fn blacklist_hits(&self) -> u64 {
        self.inner.blacklist_hits.load(Ordering::Relaxed)
    }

    /// Get the total number of storage failures seen by the engine.
    pub fn storage_errors(&self) -> u64 {
        self.inner.storage_errors.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_allowed: self.requests_allowed(),
            requests_limited: self.requests_limited(),
            blacklist_hits: self.blacklist_hits(),
            storage_errors: self.storage_errors(),
        }
    }

    /// Reset all counters to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.requests_allowed.store(0, Ordering::Relaxed);
        self.inner.requests_limited.store(0, Ordering::Relaxed);
        self.inner.blacklist_hits.store(0, Ordering::Relaxed);
        self.inner.storage_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of the throttle counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests admitted within their window limit
    pub requests_allowed: u64,
    /// Requests denied for exceeding their window limit
    pub requests_limited: u64,
    /// Requests blocked by a blacklist mark
    pub blacklist_hits: u64,
    /// Decisions that failed with a storage error
    pub storage_errors: u64,
}

impl MetricsSnapshot {
    /// Get the total number of completed decisions (errors excluded).
    pub fn total_decisions(&self) -> u64 {
        self.requests_allowed
            .saturating_add(self.requests_limited)
            .saturating_add(self.blacklist_hits)
    }

    /// Calculate the denial rate (0.0 to 1.0).
    ///
    /// Ratio of denied decisions (rate-limited plus blacklist-blocked) to
    /// completed decisions. Returns 0.0 when nothing has been decided.
    pub fn denial_rate(&self) -> f64 {
        let total = self.total_decisions();
        if total == 0 {
            0.0
        } else {
            let denied = self.requests_limited.saturating_add(self.blacklist_hits);
            denied as f64 / total as f64
        }
    }
}
