//! Diesel and pool error mapping for the lifecycle repository.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::UserLifecycleError;

/// Unique constraint guarding `users.email`.
pub(crate) const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
/// Unique constraint guarding `users.username`.
pub(crate) const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

pub(crate) fn map_pool_error(error: PoolError) -> UserLifecycleError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserLifecycleError::connection(message)
        }
    }
}

/// Lets `?` lift Diesel failures inside transaction bodies.
impl From<DieselError> for UserLifecycleError {
    fn from(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

pub(crate) fn map_diesel_error(error: DieselError) -> UserLifecycleError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => UserLifecycleError::not_found(),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(EMAIL_UNIQUE_CONSTRAINT) => UserLifecycleError::duplicate_email(),
                Some(USERNAME_UNIQUE_CONSTRAINT) => UserLifecycleError::duplicate_username(),
                _ => UserLifecycleError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserLifecycleError::connection("database connection closed")
        }
        DieselError::DatabaseError(_, info) => UserLifecycleError::query(info.message()),
        other => UserLifecycleError::query(other.to_string()),
    }
}
