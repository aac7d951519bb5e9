//! Per-signature cache records.
//!
//! Three record families, each with its own key namespace and lifetime:
//! window counters expire with the window, violation records decay after two
//! windows, the blacklist mark never expires. Records are serialized with
//! bincode; a payload that fails to decode is treated as absent, so a
//! corrupted or foreign entry degrades to a fresh start instead of an error.

use crate::domain::signature::ClientSignature;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Requests admitted during the current fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestWindow {
    /// Requests admitted since the window opened.
    pub count: u32,
    /// Window open time, seconds since the Unix epoch.
    pub started_at: u64,
}

impl RequestWindow {
    /// Cache key for a signature's window record.
    pub fn cache_key(signature: &ClientSignature) -> String {
        format!("window:{signature}")
    }

    /// An empty window opening at `now`.
    pub fn fresh(now: u64) -> Self {
        Self {
            count: 0,
            started_at: now,
        }
    }

    /// Whether `now` falls strictly after the window's end.
    ///
    /// A timestamp exactly at the end still belongs to the window. A `now`
    /// before `started_at` (clock regression) reads as in-window.
    pub fn is_expired(&self, now: u64, window: Duration) -> bool {
        now.saturating_sub(self.started_at) > window.as_secs()
    }

    /// The instant the window ends and counters reset, in epoch seconds.
    pub fn reset_at(&self, window: Duration) -> u64 {
        self.started_at.saturating_add(window.as_secs())
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bincode::deserialize(bytes).ok()
    }
}

/// Count of rate-limit violations attributed to a signature.
///
/// Written only when blacklisting is configured. The count never decreases;
/// the record disappears only when its cache TTL (two windows) lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Violations observed while the record has been live.
    pub count: u32,
}

impl ViolationRecord {
    /// Cache key for a signature's violation record.
    pub fn cache_key(signature: &ClientSignature) -> String {
        format!("violations:{signature}")
    }

    /// The record after one more violation, starting from `previous` or from
    /// zero when none is live.
    pub fn incremented(previous: Option<ViolationRecord>) -> Self {
        Self {
            count: previous.map_or(0, |record| record.count).saturating_add(1),
        }
    }

    /// Violation records outlive the window they were earned in by one more
    /// window, so consecutive-window violations accumulate.
    pub fn ttl(window: Duration) -> Duration {
        window.saturating_mul(2)
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bincode::deserialize(bytes).ok()
    }
}

/// Permanent blacklist mark.
///
/// Stored without a TTL. Presence alone means blacklisted; the payload is
/// audit detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistMark {
    /// When the mark was written, seconds since the Unix epoch.
    pub flagged_at: u64,
}

impl BlacklistMark {
    /// Cache key for a signature's blacklist mark.
    pub fn cache_key(signature: &ClientSignature) -> String {
        format!("blacklist:{signature}")
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_fresh_window_is_empty() {
        let window = RequestWindow::fresh(1_000);
        assert_eq!(window.count, 0);
        assert_eq!(window.started_at, 1_000);
    }

    #[test]
    fn test_window_live_until_strictly_past_end() {
        let window = RequestWindow::fresh(1_000);
        assert!(!window.is_expired(1_000, WINDOW));
        assert!(!window.is_expired(1_059, WINDOW));
        // Exactly at the end still counts as inside.
        assert!(!window.is_expired(1_060, WINDOW));
        assert!(window.is_expired(1_061, WINDOW));
    }

    #[test]
    fn test_clock_regression_reads_as_in_window() {
        let window = RequestWindow::fresh(1_000);
        assert!(!window.is_expired(900, WINDOW));
    }

    #[test]
    fn test_reset_at_is_window_end() {
        let window = RequestWindow::fresh(1_000);
        assert_eq!(window.reset_at(WINDOW), 1_060);
    }

    #[test]
    fn test_window_round_trips_through_bytes() {
        let window = RequestWindow {
            count: 42,
            started_at: 1_700_000_000,
        };
        let bytes = window.to_bytes().unwrap();
        assert_eq!(RequestWindow::from_bytes(&bytes), Some(window));
    }

    #[test]
    fn test_corrupted_window_bytes_read_as_absent() {
        assert_eq!(RequestWindow::from_bytes(&[0x01]), None);
        assert_eq!(RequestWindow::from_bytes(b""), None);
    }

    #[test]
    fn test_violations_increment_from_absent_and_present() {
        let first = ViolationRecord::incremented(None);
        assert_eq!(first.count, 1);
        let second = ViolationRecord::incremented(Some(first));
        assert_eq!(second.count, 2);
    }

    #[test]
    fn test_violations_saturate_instead_of_wrapping() {
        let maxed = ViolationRecord { count: u32::MAX };
        assert_eq!(ViolationRecord::incremented(Some(maxed)).count, u32::MAX);
    }

    #[test]
    fn test_violation_ttl_spans_two_windows() {
        assert_eq!(ViolationRecord::ttl(WINDOW), Duration::from_secs(120));
    }

    #[test]
    fn test_cache_keys_are_namespaced_per_record() {
        let sig = ClientSignature::derive(Some("192.0.2.1"), "curl/8.4.0");
        let window_key = RequestWindow::cache_key(&sig);
        let violations_key = ViolationRecord::cache_key(&sig);
        let blacklist_key = BlacklistMark::cache_key(&sig);

        assert!(window_key.starts_with("window:"));
        assert!(violations_key.starts_with("violations:"));
        assert!(blacklist_key.starts_with("blacklist:"));
        for key in [&window_key, &violations_key, &blacklist_key] {
            assert!(key.ends_with(&sig.to_string()));
        }
    }

    #[test]
    fn test_blacklist_mark_serializes() {
        let mark = BlacklistMark {
            flagged_at: 1_700_000_000,
        };
        assert!(!mark.to_bytes().unwrap().is_empty());
    }
}
