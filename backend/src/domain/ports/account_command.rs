//! Driving port for account registration and activation.
use async_trait::async_trait;

use crate::domain::{AccountRegistration, Error, InvitationToken, RegisteredAccount};

/// Commands that change an account's lifecycle state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an inactive account, persist its invitation, and mail it.
    ///
    /// If the invitation cannot be delivered the account is removed again.
    async fn register(&self, registration: AccountRegistration)
    -> Result<RegisteredAccount, Error>;

    /// Redeem an invitation token.
    async fn activate(&self, token: InvitationToken) -> Result<(), Error>;
}
