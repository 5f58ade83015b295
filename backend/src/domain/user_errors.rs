//! Translation of driven-port failures into domain errors.

use serde_json::json;
use tracing::error;

use super::Error;
use super::ports::UserLifecycleError;

/// Map a lifecycle store failure onto the shared error taxonomy.
pub(crate) fn map_lifecycle_error(err: UserLifecycleError) -> Error {
    match err {
        UserLifecycleError::NotFound => Error::not_found("user not found"),
        UserLifecycleError::DuplicateEmail => Error::conflict("email has already been used")
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
        UserLifecycleError::DuplicateUsername => {
            Error::conflict("username has already been used")
                .with_details(json!({ "field": "username", "code": "duplicate_username" }))
        }
        UserLifecycleError::Connection { message } => {
            error!(%message, "user store unavailable");
            Error::service_unavailable("user store unavailable")
        }
        UserLifecycleError::Timeout { operation } => {
            error!(%operation, "user store deadline exceeded");
            Error::service_unavailable("user store timed out")
        }
        UserLifecycleError::Query { message } => {
            error!(%message, "user store query failed");
            Error::internal("user store error")
        }
    }
}
