//! Cache-aside user reads.
//!
//! The cache is advisory: a failing cache is logged and bypassed, and a
//! failed refill never fails the read.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use super::ports::{UserCache, UserLifecycleRepository, UsersQuery};
use super::user_errors::map_lifecycle_error;
use super::{Error, User, UserId};

/// [`UsersQuery`] backed by the lifecycle store with an optional cache.
#[derive(Clone)]
pub struct UserQueryService {
    repository: Arc<dyn UserLifecycleRepository>,
    cache: Option<Arc<dyn UserCache>>,
}

impl UserQueryService {
    /// Read straight from the store.
    pub fn new(repository: Arc<dyn UserLifecycleRepository>) -> Self {
        Self {
            repository,
            cache: None,
        }
    }

    /// Consult `cache` before the store and refill it on a miss.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn UserCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn cached(&self, cache: &dyn UserCache, id: UserId) -> Option<User> {
        match cache.get(id).await {
            // An empty cached value decodes to the zero user, which is not
            // a usable answer for a positive id.
            Ok(Some(user)) if user.id == id => Some(user),
            Ok(Some(_)) => {
                debug!(user_id = %id, "ignoring cached placeholder user");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(user_id = %id, error = %err, "user cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl UsersQuery for UserQueryService {
    async fn fetch_user(&self, id: UserId) -> Result<User, Error> {
        if !id.is_assigned() {
            return Err(Error::invalid_request("user id must be positive")
                .with_details(json!({ "field": "id" })));
        }

        let Some(cache) = self.cache.as_deref() else {
            return self
                .repository
                .find_by_id(id)
                .await
                .map_err(map_lifecycle_error);
        };

        if let Some(user) = self.cached(cache, id).await {
            return Ok(user);
        }

        let user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(map_lifecycle_error)?;
        if let Err(err) = cache.set(&user).await {
            warn!(user_id = %id, error = %err, "user cache refill failed");
        }
        Ok(user)
    }
}
