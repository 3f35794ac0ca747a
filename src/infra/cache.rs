//! Redis cache implementation.
//!
//! Holds rate-limit counters and short-lived JSON copies of read-heavy
//! responses (listing detail, admin analytics).

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{Config, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Raw key/value access used by services for response caching.
///
/// Services treat every error from this trait as a cache miss.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Increment a counter that expires `window_seconds` after its first hit
    async fn hit_counter(&self, key: &str, window_seconds: u64) -> AppResult<u64>;

    async fn ping(&self) -> AppResult<()>;
}

/// Fixed-window rate limit check.
/// Returns (current_count, is_allowed).
pub async fn check_rate_limit(
    cache: &dyn CacheStore,
    identifier: &str,
    max_requests: u64,
    window_seconds: u64,
) -> AppResult<(u64, bool)> {
    let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
    let count = cache.hit_counter(&key, window_seconds).await?;
    Ok((count, count <= max_requests))
}

/// Read a JSON value, logging and swallowing any cache failure.
pub async fn read_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Cache read failed");
            None
        }
    }
}

/// Store a JSON value, logging and swallowing any cache failure.
pub async fn write_json<T: Serialize>(cache: &dyn CacheStore, key: &str, value: &T, ttl_seconds: u64) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Cache serialization failed");
            return;
        }
    };
    if let Err(e) = cache.set_raw(key, json, ttl_seconds).await {
        tracing::warn!(key = %key, error = %e, "Cache write failed");
    }
}

/// Drop a key, logging and swallowing any cache failure.
pub async fn evict(cache: &dyn CacheStore, key: &str) {
    if let Err(e) = cache.delete(key).await {
        tracing::warn!(key = %key, error = %e, "Cache eviction failed");
    }
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    async fn hit_counter(&self, key: &str, window_seconds: u64) -> AppResult<u64> {
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // First request in window
            let _: () = conn
                .expire(key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
