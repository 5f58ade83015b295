//! [`UserCache`] adapter storing JSON-encoded users in a [`KeyValueStore`].
//!
//! Keys are `user-{id}`. Cached values never contain the password hash.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::key_value::{KeyValueError, KeyValueStore};
use crate::domain::ports::{UserCache, UserCacheError};
use crate::domain::{User, UserId};

/// Expiry applied to cached users when not configured otherwise.
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(60);

/// Cache key for a user id.
#[must_use]
pub fn user_cache_key(id: UserId) -> String {
    format!("user-{id}")
}

fn map_store_error(err: KeyValueError) -> UserCacheError {
    UserCacheError::backend(err.to_string())
}

fn assigned(id: UserId) -> Result<UserId, UserCacheError> {
    if id.is_assigned() {
        Ok(id)
    } else {
        Err(UserCacheError::invalid_id(id.get()))
    }
}

/// Cache-aside adapter over any key-value store.
#[derive(Clone)]
pub struct KeyValueUserCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl KeyValueUserCache {
    /// Cache users in `store` for [`DEFAULT_USER_TTL`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: DEFAULT_USER_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[async_trait]
impl UserCache for KeyValueUserCache {
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError> {
        let key = user_cache_key(assigned(id)?);
        let Some(bytes) = self.store.get(&key).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(Some(User::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| UserCacheError::serialization(err.to_string()))
    }

    async fn set(&self, user: &User) -> Result<(), UserCacheError> {
        let key = user_cache_key(assigned(user.id)?);
        let bytes = serde_json::to_vec(user)
            .map_err(|err| UserCacheError::serialization(err.to_string()))?;
        self.store
            .set_with_ttl(&key, &bytes, self.ttl)
            .await
            .map_err(map_store_error)
    }
}
