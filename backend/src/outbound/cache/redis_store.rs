//! Redis-backed [`KeyValueStore`] using a `bb8` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{RedisConnectionManager, bb8};
use tracing::debug;

use super::key_value::{KeyValueError, KeyValueStore};

/// Pooled Redis client.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisKeyValueStore {
    /// Connect to `url` (for example `redis://localhost:6379/0`).
    ///
    /// # Errors
    /// Returns [`KeyValueError::Connection`] when the URL is invalid or the
    /// initial connections cannot be opened.
    pub async fn connect(url: &str, max_size: u32) -> Result<Self, KeyValueError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| KeyValueError::connection(err.to_string()))?;
        let pool = bb8::Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|err| KeyValueError::connection(err.to_string()))?;
        Ok(Self { pool })
    }
}

/// Redis expiries are whole seconds; sub-second TTLs round up to one.
fn ttl_seconds(ttl: Duration) -> u64 {
    let whole = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        whole.saturating_add(1)
    } else {
        whole.max(1)
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KeyValueError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| KeyValueError::connection(err.to_string()))?;
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|err| KeyValueError::command(err.to_string()))?;
        debug!(key, hit = value.is_some(), "redis get");
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), KeyValueError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| KeyValueError::connection(err.to_string()))?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds(ttl))
            .await
            .map_err(|err| KeyValueError::command(err.to_string()))
    }
}
