//! Failing cache for testing storage-error handling.

use crate::application::ports::{Cache, StorageError};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Cache whose every operation fails.
///
/// Drives tests that assert storage errors propagate to the caller instead
/// of being turned into allow or deny decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCache;

impl FailingCache {
    /// Create a new failing cache.
    pub fn new() -> Self {
        Self
    }
}

/// The error every operation reports.
#[derive(Debug)]
struct BackendDown;

impl fmt::Display for BackendDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("backend unavailable")
    }
}

impl Error for BackendDown {}

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::read(key, BackendDown))
    }

    async fn set(
        &self,
        key: &str,
        _value: Vec<u8>,
        _ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        Err(StorageError::write(key, BackendDown))
    }
}
