//! Driven port delivering account invitations.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::User;

define_port_error! {
    /// Errors surfaced by mail adapters.
    pub enum InvitationMailerError {
        /// The message could not be handed to the transport.
        Delivery { message: String } => "invitation delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    /// Send `user` the link that redeems their invitation.
    async fn send_invitation(
        &self,
        user: &User,
        activation_url: &str,
    ) -> Result<(), InvitationMailerError>;
}
