//! User identity model.
//!
//! A [`User`] is what the lifecycle store persists and what the cache holds.
//! The password hash never leaves the process: it is skipped during
//! serialisation, so cached copies and API payloads carry an empty hash.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Role assigned to accounts registered without an explicit role.
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Numeric user identifier assigned by the store.
///
/// Only positive values identify persisted users; zero is the unassigned
/// identifier carried by a default [`User`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier without validation.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether the identifier can refer to a persisted user.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Named permission tier attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Store-assigned identifier.
    pub id: i64,
    /// Unique role name such as `user` or `admin`.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Ordering of privileges; higher levels dominate lower ones.
    pub level: i32,
}

/// Argon2 password hash in PHC string format.
///
/// The default value is the empty hash, which verifies nothing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordHash(String);

/// Password hashing failed inside Argon2.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl PasswordHash {
    /// Hash `plaintext` with a fresh random salt.
    pub fn from_plaintext(plaintext: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })
    }

    /// Wrap a hash previously produced by [`PasswordHash::from_plaintext`].
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the hash is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check `candidate` against the stored hash.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Ok(parsed) = argon2::PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("PasswordHash(<empty>)")
        } else {
            f.write_str("PasswordHash(<redacted>)")
        }
    }
}

/// Persisted user identity.
///
/// The default value is the "zero" user: unassigned id, empty strings, the
/// Unix epoch as creation time, and an empty role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Unique handle.
    pub username: String,
    /// Unique, lower-cased email address.
    pub email: String,
    /// Argon2 hash; never serialised.
    #[serde(skip)]
    pub password: PasswordHash,
    /// Creation timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
    /// Set once the invitation has been redeemed.
    pub is_active: bool,
    /// Foreign key of [`User::role`].
    pub role_id: i64,
    /// Resolved role.
    pub role: Role,
}

#[cfg(test)]
mod tests;
