//! In-memory cache adapter.
//!
//! The default backend: a concurrent map of byte entries with optional
//! expiry. Suited to single-process deployments; multi-process deployments
//! share state through the Redis adapter instead.

use crate::application::ports::{Cache, Clock, StorageError};
use crate::infrastructure::clock::SystemClock;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

impl StoredEntry {
    /// An entry stays readable through its expiry instant and reads as
    /// absent strictly after it.
    fn is_expired(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}

/// Concurrent in-process cache with per-entry expiry.
///
/// Expiry is lazy: an expired entry is dropped when it is next read. Entries
/// that are never read again linger until
/// [`purge_expired`](InMemoryCache::purge_expired) sweeps them.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: DashMap<String, StoredEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Create a cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear()
    }

    /// Drop entries whose expiry has passed.
    ///
    /// Returns how many entries were dropped. Useful as a periodic
    /// maintenance task in long-running processes with churning clients.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let now = self.clock.now();
        let (value, expired) = match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => (None, true),
            Some(entry) => (Some(entry.value.clone()), false),
            None => (None, false),
        };
        if expired {
            // Re-check under the entry lock; a writer may have refreshed it.
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let expires_at = ttl.map(|ttl| self.clock.now() + ttl);
        self.entries
            .insert(key.to_string(), StoredEntry { value, expires_at });
        Ok(())
    }
}
