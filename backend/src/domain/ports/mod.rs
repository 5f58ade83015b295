//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`UserLifecycleRepository`, `UserCache`, `InvitationMailer`)
//! are implemented by outbound adapters. Driving ports (`UsersQuery`,
//! `AccountCommand`) are implemented by domain services and consumed by the
//! HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod invitation_mailer;
mod user_cache;
mod user_lifecycle_repository;
mod users_query;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use invitation_mailer::MockInvitationMailer;
pub use invitation_mailer::{InvitationMailer, InvitationMailerError};
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{UserCache, UserCacheError};
#[cfg(test)]
pub use user_lifecycle_repository::MockUserLifecycleRepository;
pub use user_lifecycle_repository::{UserLifecycleError, UserLifecycleRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
