//! Redis-backed cache implementation.
//!
//! Provides a distributed cache backend using Redis, allowing throttle state
//! to be shared across multiple application instances.
//!
//! ## Architecture
//!
//! The Redis cache uses a simple key-value model:
//! - Keys: record namespace plus signature hex, with a configurable prefix
//! - Values: serialized records (bincode format), opaque to this adapter
//! - TTL: per-write, chosen by the engine (windows expire, violations decay,
//!   blacklist marks never expire)
//!
//! ## Features
//!
//! - Automatic reconnection via `redis::aio::ConnectionManager`
//! - Async-only interface (requires `tokio` runtime)
//!
//! ## Error handling
//!
//! Redis failures surface as [`StorageError`] values from `get`/`set` and
//! propagate out of the engine untouched. This adapter never converts an
//! outage into an allow or a deny; that policy belongs to the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use client_throttle::{RedisCache, RedisCacheConfig, Throttle};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = RedisCache::connect("redis://127.0.0.1/")
//!         .await
//!         .expect("Failed to connect to Redis");
//!
//!     let throttle = Throttle::builder()
//!         .with_cache(Arc::new(cache))
//!         .build()
//!         .expect("valid configuration");
//! }
//! ```

use crate::application::ports::{Cache, StorageError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Configuration for the Redis cache.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Key prefix for Redis keys (default: "client-throttle:")
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "client-throttle:".to_string(),
        }
    }
}

/// Redis-backed cache for distributed throttling.
///
/// This cache implementation allows multiple application instances to share
/// window counters, violation records and blacklist marks via Redis.
pub struct RedisCache {
    connection: Arc<RwLock<ConnectionManager>>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connect to Redis with default configuration.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        Self::connect_with_config(url, RedisCacheConfig::default()).await
    }

    /// Connect to Redis with custom configuration.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL
    /// * `config` - Cache configuration
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect_with_config(
        url: &str,
        config: RedisCacheConfig,
    ) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection: Arc::new(RwLock::new(connection)),
            config,
        })
    }

    /// Get the Redis key for an engine key.
    fn key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }
}

impl Clone for RedisCache {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            config: self.config.clone(),
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let redis_key = self.key(key);
        let mut conn = self.connection.write().await;

        conn.get(&redis_key)
            .await
            .map_err(|err| StorageError::read(key, err))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let redis_key = self.key(key);
        let mut conn = self.connection.write().await;

        match ttl {
            Some(ttl) => {
                // SETEX takes whole seconds; flooring to zero would mean "no
                // expiry", so sub-second TTLs round up to one second.
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(&redis_key, value, ttl_secs)
                    .await
                    .map_err(|err| StorageError::write(key, err))
            }
            None => conn
                .set::<_, _, ()>(&redis_key, value)
                .await
                .map_err(|err| StorageError::write(key, err)),
        }
    }
}
