//! Invitation tokens.
//!
//! The plaintext token is mailed to the user and never stored. The store
//! keys invitations by the lower-case hex SHA-256 digest of the token.

use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Token supplied to an invitation endpoint was blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invitation token must not be empty")]
pub struct InvitationTokenError;

/// Plaintext invitation token.
#[derive(Clone, PartialEq, Eq)]
pub struct InvitationToken(Zeroizing<String>);

impl InvitationToken {
    /// Issue a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Zeroizing::new(Uuid::new_v4().to_string()))
    }

    /// Accept a token presented by a client.
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvitationTokenError> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return Err(InvitationTokenError);
        }
        Ok(Self(raw))
    }

    /// Borrow the plaintext for delivery.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest under which the invitation is stored.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::InvitationToken;
    ///
    /// let token = InvitationToken::parse("abc").expect("token");
    /// assert_eq!(
    ///     token.digest().as_str(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvitationToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of an [`InvitationToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
