//! Invitation mailer that writes deliveries to the log.
//!
//! Stands in for an SMTP or HTTP mail provider. The activation link carries
//! the plaintext token, so it is only emitted at debug level.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::User;
use crate::domain::ports::{InvitationMailer, InvitationMailerError};

#[derive(Debug, Clone, Default)]
pub struct LoggingInvitationMailer {
    sender: String,
}

impl LoggingInvitationMailer {
    /// Mailer announcing itself as `sender`.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl InvitationMailer for LoggingInvitationMailer {
    async fn send_invitation(
        &self,
        user: &User,
        activation_url: &str,
    ) -> Result<(), InvitationMailerError> {
        if user.email.is_empty() {
            return Err(InvitationMailerError::delivery("recipient has no email address"));
        }
        info!(
            user_id = %user.id,
            recipient = %user.email,
            sender = %self.sender,
            "invitation queued"
        );
        debug!(user_id = %user.id, activation_url, "invitation link");
        Ok(())
    }
}
