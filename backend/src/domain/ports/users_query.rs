//! Driving port for reading users.
use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Read access to active users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch an active user, consulting the cache first when one is wired.
    async fn fetch_user(&self, id: UserId) -> Result<User, Error>;
}
