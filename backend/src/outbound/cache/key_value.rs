//! Byte-oriented key-value store with per-entry expiry.
use std::time::Duration;

use async_trait::async_trait;

/// Failures reported by key-value stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValueError {
    /// The store could not be reached.
    #[error("key-value store connection failed: {message}")]
    Connection { message: String },
    /// The store rejected or failed a command.
    #[error("key-value store command failed: {message}")]
    Command { message: String },
}

impl KeyValueError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }
}

/// Minimal store surface needed by the cache adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the bytes stored under `key`; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KeyValueError>;

    /// Store `value` under `key`, replacing any previous value, for `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration)
    -> Result<(), KeyValueError>;
}
