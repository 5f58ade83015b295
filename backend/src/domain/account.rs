//! Registration inputs.
//!
//! Raw request values are validated into [`Username`], [`EmailAddress`], and
//! [`Password`] before the account service sees them. The password hash is
//! computed by the service, which turns an [`AccountRegistration`] into the
//! [`NewAccount`] handed to the lifecycle store.

use std::fmt;

use zeroize::Zeroizing;

use super::invitation::InvitationToken;
use super::user::{DEFAULT_ROLE_NAME, PasswordHash, User};

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 100;
/// Maximum email length in characters.
pub const EMAIL_MAX: usize = 255;
/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 3;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 72;

/// Validation failures for registration input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("email must be a valid address")]
    MalformedEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("password must be at most {max} characters")]
    PasswordTooLong { max: usize },
}

impl AccountValidationError {
    /// Name of the request field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::UsernameTooLong { .. } => "username",
            Self::EmptyEmail | Self::EmailTooLong { .. } | Self::MalformedEmail => "email",
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => "password",
        }
    }

    /// Stable snake_case identifier for the failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::UsernameTooLong { .. } => "username_too_long",
            Self::EmptyEmail => "empty_email",
            Self::EmailTooLong { .. } => "email_too_long",
            Self::MalformedEmail => "malformed_email",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordTooLong { .. } => "password_too_long",
        }
    }
}

/// Trimmed, non-empty username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Validate a raw username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Lower-cased email address with a plausible `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise a raw email address.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "ada@example.com");
    /// assert!(EmailAddress::new("ada@localhost").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(AccountValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !is_plausible_email(trimmed) {
            return Err(AccountValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Borrow the normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_plausible_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Plaintext password held in zeroising storage.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a raw password. Surrounding whitespace is significant.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = Zeroizing::new(raw.into());
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(AccountValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(AccountValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct AccountRegistration {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

/// Account ready to be persisted: validated identity plus password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    username: Username,
    email: EmailAddress,
    password: PasswordHash,
    role: Option<String>,
}

impl NewAccount {
    /// Account with the default role.
    #[must_use]
    pub fn new(username: Username, email: EmailAddress, password: PasswordHash) -> Self {
        Self {
            username,
            email,
            password,
            role: None,
        }
    }

    /// Request a specific role by name.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    #[must_use]
    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Requested role, falling back to [`DEFAULT_ROLE_NAME`].
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE_NAME)
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    /// The inactive user as persisted.
    pub user: User,
    /// Plaintext invitation token; only its digest is stored.
    pub token: InvitationToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", AccountValidationError::EmptyUsername)]
    #[case("   ", AccountValidationError::EmptyUsername)]
    fn blank_usernames_are_rejected(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(Username::new(raw), Err(expected));
    }

    #[rstest]
    fn username_length_is_bounded() {
        let at_limit = "u".repeat(USERNAME_MAX);
        assert!(Username::new(&at_limit).is_ok());
        let over = "u".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(over),
            Err(AccountValidationError::UsernameTooLong { max: USERNAME_MAX })
        );
    }

    #[rstest]
    #[case("ada@example.com")]
    #[case("ada.lovelace+test@mail.example.org")]
    fn accepts_plausible_emails(#[case] raw: &str) {
        assert!(EmailAddress::new(raw).is_ok());
    }

    #[rstest]
    #[case("ada")]
    #[case("@example.com")]
    #[case("ada@")]
    #[case("ada@example")]
    #[case("ada@@example.com")]
    #[case("ada@example..com")]
    #[case("ada lovelace@example.com")]
    fn rejects_malformed_emails(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw),
            Err(AccountValidationError::MalformedEmail)
        );
    }

    #[rstest]
    fn email_is_normalised_to_lower_case() {
        let email = EmailAddress::new("Grace@Example.COM").expect("valid email");
        assert_eq!(email.as_str(), "grace@example.com");
    }

    #[rstest]
    #[case("ab", Some(AccountValidationError::PasswordTooShort { min: PASSWORD_MIN }))]
    #[case("abc", None)]
    fn password_minimum_length(
        #[case] raw: &str,
        #[case] expected: Option<AccountValidationError>,
    ) {
        assert_eq!(Password::new(raw).err(), expected);
    }

    #[rstest]
    fn password_maximum_length() {
        let over = "p".repeat(PASSWORD_MAX + 1);
        assert_eq!(
            Password::new(over).err(),
            Some(AccountValidationError::PasswordTooLong { max: PASSWORD_MAX })
        );
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter22").expect("valid password");
        assert_eq!(format!("{password:?}"), "Password(<redacted>)");
    }

    #[rstest]
    fn new_account_defaults_role() {
        let account = NewAccount::new(
            Username::new("ada").expect("username"),
            EmailAddress::new("ada@example.com").expect("email"),
            PasswordHash::default(),
        );
        assert_eq!(account.role_name(), DEFAULT_ROLE_NAME);
        assert_eq!(account.with_role("admin").role_name(), "admin");
    }

    #[rstest]
    fn validation_errors_name_their_field() {
        assert_eq!(AccountValidationError::MalformedEmail.field(), "email");
        assert_eq!(AccountValidationError::EmptyUsername.field(), "username");
        assert_eq!(
            AccountValidationError::PasswordTooShort { min: 3 }.field(),
            "password"
        );
    }
}
