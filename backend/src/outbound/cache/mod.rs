//! User cache adapters.
//!
//! [`KeyValueUserCache`] implements the `UserCache` port over a
//! [`KeyValueStore`]. Production deployments use [`RedisKeyValueStore`];
//! [`InMemoryKeyValueStore`] serves single-instance runs and tests.

mod key_value;
mod memory_store;
mod redis_store;
mod user_cache;

pub use key_value::{KeyValueError, KeyValueStore};
pub use memory_store::InMemoryKeyValueStore;
pub use redis_store::RedisKeyValueStore;
pub use user_cache::{DEFAULT_USER_TTL, KeyValueUserCache, user_cache_key};
