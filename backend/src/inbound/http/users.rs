//! Users API handlers.
//!
//! ```text
//! POST /v1/authentication/user {"username":"ada","email":"ada@example.com","password":"secret"}
//! PUT /v1/users/activate/{token}
//! GET /v1/users/{user_id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AccountRegistration, AccountValidationError, EmailAddress, Error, InvitationToken, Password,
    User, UserId, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /v1/authentication/user`.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<RegisterUserRequest> for AccountRegistration {
    type Error = AccountValidationError;

    fn try_from(value: RegisterUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: Username::new(&value.username)?,
            email: EmailAddress::new(&value.email)?,
            password: Password::new(value.password)?,
        })
    }
}

/// Registration response: the inactive user and the activation token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResponse {
    pub user: User,
    pub token: String,
}

fn map_validation_error(err: AccountValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.code() }))
}

/// Register an inactive account and send its invitation.
#[post("/authentication/user")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        AccountRegistration::try_from(payload.into_inner()).map_err(map_validation_error)?;
    let registered = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse {
        token: registered.token.expose().to_owned(),
        user: registered.user,
    }))
}

/// Redeem an invitation token.
#[put("/users/activate/{token}")]
pub async fn activate_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let token = InvitationToken::parse(path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "token", "code": "empty_token" }))
    })?;
    state.accounts.activate(token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch an active user by identifier.
#[get("/users/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users.fetch_user(id).await?;
    Ok(web::Json(user))
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<i64>()
        .ok()
        .map(UserId::new)
        .filter(|id| id.is_assigned())
        .ok_or_else(|| {
            Error::invalid_request("user id must be a positive integer")
                .with_details(json!({ "field": "userId", "code": "invalid_user_id" }))
        })
}

/// JSON extractor settings shared by the users scope.
///
/// Malformed bodies are reported through the standard error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            Error::invalid_request(format!("invalid JSON body: {err}")).into()
        })
}
