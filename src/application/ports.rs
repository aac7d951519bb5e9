//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::event::ThrottleEvent;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{self, Debug};
use std::time::{Duration, SystemTime};

/// Error returned by a [`Cache`] backend.
///
/// Wraps the backend's own error and names the key the operation was about.
/// The engine propagates these unchanged: it never retries, and it never
/// converts a storage failure into an allow or a deny. Whether to fail open
/// or fail closed is the caller's decision.
#[derive(Debug)]
pub enum StorageError {
    /// A read from the backend failed.
    Read {
        /// Cache key the operation was addressing.
        key: String,
        /// Underlying backend error.
        source: Box<dyn Error + Send + Sync>,
    },
    /// A write to the backend failed.
    Write {
        /// Cache key the operation was addressing.
        key: String,
        /// Underlying backend error.
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// A read failure for `key`.
    pub fn read(key: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        StorageError::Read {
            key: key.into(),
            source: source.into(),
        }
    }

    /// A write failure for `key`.
    pub fn write(key: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        StorageError::Write {
            key: key.into(),
            source: source.into(),
        }
    }

    /// The cache key the failed operation was addressing.
    pub fn key(&self) -> &str {
        match self {
            StorageError::Read { key, .. } | StorageError::Write { key, .. } => key,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read { key, source } => {
                write!(f, "cache read failed for key `{key}`: {source}")
            }
            StorageError::Write { key, source } => {
                write!(f, "cache write failed for key `{key}`: {source}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StorageError::Read { source, .. } | StorageError::Write { source, .. } => {
                let source: &(dyn Error + 'static) = source.as_ref();
                Some(source)
            }
        }
    }
}

/// Port for shared byte storage with per-entry expiry.
///
/// This abstraction allows the application layer to persist window, violation
/// and blacklist records without depending on a specific backend.
/// Infrastructure provides concrete implementations (InMemoryCache,
/// RedisCache).
///
/// Implementations must be usable concurrently through a shared reference;
/// the engine never serializes access around them.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Fetch the bytes stored under `key`, if any.
    ///
    /// Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value and expiry.
    ///
    /// `ttl: None` means the entry never expires.
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>;
}

/// Port for obtaining current wall-clock time.
///
/// This abstraction allows the application layer to work with time without
/// depending on the system clock. Infrastructure provides concrete
/// implementations (SystemClock, MockClock).
///
/// Wall-clock time rather than a monotonic instant: window state crosses
/// process boundaries through the cache, so timestamps must be comparable
/// between processes.
pub trait Clock: Send + Sync + Debug {
    /// Get the current time.
    fn now(&self) -> SystemTime;
}

/// Port for publishing throttle events.
///
/// Sinks are fire-and-forget: `emit` returns nothing and must not block the
/// request path on external systems. A sink that cannot deliver an event
/// drops it; the decision has already been made.
pub trait EventSink: Send + Sync + Debug {
    /// Publish one event.
    fn emit(&self, event: &ThrottleEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_storage_error_display_names_key() {
        let err = StorageError::read("window:abc", io::Error::new(io::ErrorKind::Other, "boom"));
        let rendered = err.to_string();
        assert!(rendered.contains("read"));
        assert!(rendered.contains("window:abc"));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn test_storage_error_exposes_source() {
        let err = StorageError::write("blacklist:abc", io::Error::new(io::ErrorKind::Other, "down"));
        assert_eq!(err.key(), "blacklist:abc");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("down"));
    }
}
