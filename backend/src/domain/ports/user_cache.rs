//! Driven port for the read-through user cache.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{User, UserId};

define_port_error! {
    /// Errors surfaced by user cache adapters.
    pub enum UserCacheError {
        /// The id cannot refer to a persisted user.
        InvalidId { id: i64 } => "user id {id} is not cacheable",
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "user cache backend failure: {message}",
        /// Cached bytes could not be encoded or decoded.
        Serialization { message: String } => "user cache serialisation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Read a cached user. `Ok(None)` is a miss.
    ///
    /// An empty cached value decodes to the default user.
    async fn get(&self, id: UserId) -> Result<Option<User>, UserCacheError>;

    /// Store `user` under its id with the adapter's expiry.
    async fn set(&self, user: &User) -> Result<(), UserCacheError>;
}
