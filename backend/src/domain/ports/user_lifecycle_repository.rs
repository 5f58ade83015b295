//! Driven port for the user lifecycle store.
//!
//! Multi-row operations are atomic: an adapter either applies every row
//! change of an operation or none of them.

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{InvitationToken, NewAccount, User, UserId};

define_port_error! {
    /// Failures reported by lifecycle store adapters.
    pub enum UserLifecycleError {
        /// No matching user, or no live invitation for the token.
        NotFound => "user not found",
        /// Another account already uses the email address.
        DuplicateEmail => "email has already been used",
        /// Another account already uses the username.
        DuplicateUsername => "username has already been used",
        /// The store could not be reached.
        Connection { message: String } => "user store connection failed: {message}",
        /// The operation exceeded its deadline and was rolled back.
        Timeout { operation: String } => "user store {operation} timed out",
        /// Any other store failure.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Persistence for user accounts and their invitations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserLifecycleRepository: Send + Sync {
    /// Insert the inactive user and its invitation in one transaction.
    ///
    /// The invitation is keyed by the token digest and expires `expires_in`
    /// after the store's current time. Returns the persisted user with its
    /// assigned id, creation time, and resolved role.
    async fn create_and_invite(
        &self,
        account: &NewAccount,
        token: &InvitationToken,
        expires_in: Duration,
    ) -> Result<User, UserLifecycleError>;

    /// Redeem a live invitation: mark its user active and drop all of that
    /// user's invitations.
    ///
    /// Unknown and expired tokens yield [`UserLifecycleError::NotFound`];
    /// an expired invitation is left untouched.
    async fn activate(&self, token: &InvitationToken) -> Result<(), UserLifecycleError>;

    /// Delete the user and any invitations it still holds.
    async fn delete(&self, id: UserId) -> Result<(), UserLifecycleError>;

    /// Fetch an active user by id.
    async fn find_by_id(&self, id: UserId) -> Result<User, UserLifecycleError>;

    /// Fetch an active user by email.
    async fn find_by_email(&self, email: &str) -> Result<User, UserLifecycleError>;
}
