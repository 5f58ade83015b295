//! Account registration and activation.
//!
//! Registration spans two systems: the store commits the user and its
//! invitation atomically, then the mailer delivers the token. If delivery
//! fails the freshly committed user is deleted again so a retry with the
//! same email or username is not blocked by a dead account.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::ports::{AccountCommand, InvitationMailer, UserLifecycleRepository};
use super::user_errors::map_lifecycle_error;
use super::{
    AccountRegistration, Error, InvitationToken, NewAccount, Password, PasswordHash,
    RegisteredAccount,
};

/// How long an invitation stays redeemable when not configured otherwise.
pub const DEFAULT_INVITATION_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Invitation expiry and the front-end route that redeems tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationPolicy {
    ttl: Duration,
    frontend_url: String,
}

impl InvitationPolicy {
    /// Invitations valid for `ttl`, redeemed under `frontend_url`.
    pub fn new(ttl: Duration, frontend_url: impl Into<String>) -> Self {
        Self {
            ttl,
            frontend_url: frontend_url.into(),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Link mailed to the user.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use social_backend::domain::{InvitationPolicy, InvitationToken};
    ///
    /// let policy = InvitationPolicy::new(Duration::from_secs(60), "https://social.test/");
    /// let token = InvitationToken::parse("abc").expect("token");
    /// assert_eq!(policy.activation_url(&token), "https://social.test/confirm/abc");
    /// ```
    #[must_use]
    pub fn activation_url(&self, token: &InvitationToken) -> String {
        format!(
            "{}/confirm/{}",
            self.frontend_url.trim_end_matches('/'),
            token.expose()
        )
    }
}

/// [`AccountCommand`] implementation over the lifecycle store and mailer.
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn UserLifecycleRepository>,
    mailer: Arc<dyn InvitationMailer>,
    policy: InvitationPolicy,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn UserLifecycleRepository>,
        mailer: Arc<dyn InvitationMailer>,
        policy: InvitationPolicy,
    ) -> Self {
        Self {
            repository,
            mailer,
            policy,
        }
    }
}

/// Hashes on the blocking pool.
async fn hash_password(password: Password) -> Result<PasswordHash, Error> {
    tokio::task::spawn_blocking(move || PasswordHash::from_plaintext(password.expose()))
        .await
        .map_err(|err| {
            error!(error = %err, "password hashing task failed");
            Error::internal("failed to hash password")
        })?
        .map_err(|err| {
            error!(error = %err, "password hashing rejected input");
            Error::internal("failed to hash password")
        })
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(
        &self,
        registration: AccountRegistration,
    ) -> Result<RegisteredAccount, Error> {
        let AccountRegistration {
            username,
            email,
            password,
        } = registration;
        let account = NewAccount::new(username, email, hash_password(password).await?);
        let token = InvitationToken::generate();

        let user = self
            .repository
            .create_and_invite(&account, &token, self.policy.ttl())
            .await
            .map_err(map_lifecycle_error)?;

        let activation_url = self.policy.activation_url(&token);
        if let Err(err) = self.mailer.send_invitation(&user, &activation_url).await {
            warn!(user_id = %user.id, error = %err, "invitation delivery failed; removing account");
            if let Err(cleanup) = self.repository.delete(user.id).await {
                error!(
                    user_id = %user.id,
                    error = %cleanup,
                    "failed to remove account after delivery failure"
                );
            }
            return Err(Error::internal("failed to deliver invitation"));
        }

        info!(user_id = %user.id, "account registered");
        Ok(RegisteredAccount { user, token })
    }

    async fn activate(&self, token: InvitationToken) -> Result<(), Error> {
        self.repository
            .activate(&token)
            .await
            .map_err(map_lifecycle_error)?;
        info!("account activated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        InvitationMailerError, MockInvitationMailer, MockUserLifecycleRepository,
        UserLifecycleError,
    };
    use crate::domain::{EmailAddress, ErrorCode, User, UserId, Username};
    use rstest::{fixture, rstest};

    const FRONTEND: &str = "http://localhost:3000";

    #[fixture]
    fn registration() -> AccountRegistration {
        AccountRegistration {
            username: Username::new("ada").expect("username"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            password: Password::new("analytical").expect("password"),
        }
    }

    fn policy() -> InvitationPolicy {
        InvitationPolicy::new(DEFAULT_INVITATION_TTL, FRONTEND)
    }

    fn persisted(account: &NewAccount) -> User {
        User {
            id: UserId::new(11),
            username: account.username().to_owned(),
            email: account.email().to_owned(),
            password: account.password().clone(),
            ..User::default()
        }
    }

    fn repository_accepting_create() -> MockUserLifecycleRepository {
        let mut repository = MockUserLifecycleRepository::new();
        repository
            .expect_create_and_invite()
            .times(1)
            .withf(|account, _, ttl| {
                account.username() == "ada"
                    && account.role_name() == "user"
                    && *ttl == DEFAULT_INVITATION_TTL
            })
            .returning(|account, _, _| Ok(persisted(account)));
        repository
    }

    #[rstest]
    #[tokio::test]
    async fn register_persists_then_mails(registration: AccountRegistration) {
        let mut repository = repository_accepting_create();
        repository.expect_delete().never();
        let mut mailer = MockInvitationMailer::new();
        mailer
            .expect_send_invitation()
            .times(1)
            .withf(|user, url| {
                user.id == UserId::new(11) && url.starts_with("http://localhost:3000/confirm/")
            })
            .returning(|_, _| Ok(()));
        let service = AccountService::new(Arc::new(repository), Arc::new(mailer), policy());

        let registered = service.register(registration).await.expect("registered");

        assert_eq!(registered.user.id, UserId::new(11));
        assert!(registered.user.password.verify("analytical"));
        assert!(!registered.token.expose().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn failed_delivery_removes_the_account(registration: AccountRegistration) {
        let mut repository = repository_accepting_create();
        repository
            .expect_delete()
            .times(1)
            .withf(|id| *id == UserId::new(11))
            .returning(|_| Ok(()));
        let mut mailer = MockInvitationMailer::new();
        mailer
            .expect_send_invitation()
            .times(1)
            .returning(|_, _| Err(InvitationMailerError::delivery("smtp timeout")));
        let service = AccountService::new(Arc::new(repository), Arc::new(mailer), policy());

        let err = service.register(registration).await.expect_err("delivery failure");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_cleanup_still_reports_delivery_failure(registration: AccountRegistration) {
        let mut repository = repository_accepting_create();
        repository
            .expect_delete()
            .times(1)
            .returning(|_| Err(UserLifecycleError::connection("gone")));
        let mut mailer = MockInvitationMailer::new();
        mailer
            .expect_send_invitation()
            .returning(|_, _| Err(InvitationMailerError::delivery("bounced")));
        let service = AccountService::new(Arc::new(repository), Arc::new(mailer), policy());

        let err = service.register(registration).await.expect_err("delivery failure");

        assert_eq!(err.message(), "failed to deliver invitation");
    }

    #[rstest]
    #[case(UserLifecycleError::duplicate_email(), ErrorCode::Conflict)]
    #[case(UserLifecycleError::duplicate_username(), ErrorCode::Conflict)]
    #[case(UserLifecycleError::timeout("create_and_invite"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn store_rejections_skip_delivery(
        registration: AccountRegistration,
        #[case] failure: UserLifecycleError,
        #[case] expected: ErrorCode,
    ) {
        let mut repository = MockUserLifecycleRepository::new();
        repository
            .expect_create_and_invite()
            .times(1)
            .returning(move |_, _, _| Err(failure.clone()));
        repository.expect_delete().never();
        let mut mailer = MockInvitationMailer::new();
        mailer.expect_send_invitation().never();
        let service = AccountService::new(Arc::new(repository), Arc::new(mailer), policy());

        let err = service.register(registration).await.expect_err("rejected");

        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[case(Ok(()), None)]
    #[case(Err(UserLifecycleError::not_found()), Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn activate_delegates_to_store(
        #[case] outcome: Result<(), UserLifecycleError>,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut repository = MockUserLifecycleRepository::new();
        repository
            .expect_activate()
            .times(1)
            .withf(|token| token.expose() == "opaque-token")
            .returning(move |_| outcome.clone());
        let service = AccountService::new(
            Arc::new(repository),
            Arc::new(MockInvitationMailer::new()),
            policy(),
        );

        let result = service
            .activate(InvitationToken::parse("opaque-token").expect("token"))
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }

    #[rstest]
    fn activation_url_tolerates_trailing_slash() {
        let policy = InvitationPolicy::new(Duration::from_secs(1), "https://social.test/");
        let token = InvitationToken::parse("t0k3n").expect("token");
        assert_eq!(policy.activation_url(&token), "https://social.test/confirm/t0k3n");
    }
}
