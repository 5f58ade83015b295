//! Domain types, services, and ports.
//!
//! Purpose: hold the transport-agnostic core. Services here implement the
//! driving ports consumed by the HTTP adapter and depend only on the driven
//! ports declared in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: shared failure taxonomy.
//! - User / UserId / Role / PasswordHash: persisted identity.
//! - FixedWindowLimiter: per-client admission control.
//! - UserQueryService / AccountService: driving port implementations.

pub mod account;
pub mod account_service;
pub mod admission;
pub mod error;
pub mod invitation;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_query_service;
mod user_errors;

pub use self::account::{
    AccountRegistration, AccountValidationError, EmailAddress, NewAccount, Password,
    RegisteredAccount, Username,
};
pub use self::account_service::{AccountService, DEFAULT_INVITATION_TTL, InvitationPolicy};
pub use self::admission::{
    AdmissionDecision, DEFAULT_REQUESTS_PER_WINDOW, DEFAULT_WINDOW, FixedWindowLimiter,
    LimiterConfig, LimiterConfigError, MAX_WINDOW,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::invitation::{InvitationToken, InvitationTokenError, TokenDigest};
pub use self::trace_id::TraceId;
pub use self::user::{
    DEFAULT_ROLE_NAME, PasswordHash, PasswordHashError, Role, User, UserId,
};
pub use self::user_query_service::UserQueryService;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
