//! PostgreSQL-backed `UserLifecycleRepository` using Diesel ORM.
//!
//! Multi-row operations run inside one database transaction bounded by the
//! query timeout. When the deadline passes the in-flight transaction future
//! is dropped; the pooled connection is then discarded rather than reused,
//! and PostgreSQL rolls the transaction back when the session ends.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::{ScopedBoxFuture, ScopedFutureExt};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use mockable::{Clock, DefaultClock};
use tracing::debug;

use super::diesel_error_mapping::map_pool_error;
use super::models::{NewInvitationRow, NewUserRow, RoleRow, UserRow};
use super::pool::DbPool;
use super::schema::{roles, user_invitations, users};
use crate::domain::ports::{UserLifecycleError, UserLifecycleRepository};
use crate::domain::{InvitationToken, NewAccount, User, UserId};

/// Deadline applied to every repository operation unless overridden.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Diesel-backed implementation of [`UserLifecycleRepository`].
#[derive(Clone)]
pub struct DieselUserLifecycleRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    query_timeout: Duration,
}

impl DieselUserLifecycleRepository {
    /// Repository on the system clock with [`DEFAULT_QUERY_TIMEOUT`].
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            clock: Arc::new(DefaultClock),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Replace the clock used for invitation expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Await `work`, failing with a timeout once the query deadline passes.
    async fn bounded<T, Fut>(
        &self,
        operation: &'static str,
        work: Fut,
    ) -> Result<T, UserLifecycleError>
    where
        Fut: Future<Output = Result<T, UserLifecycleError>>,
    {
        tokio::time::timeout(self.query_timeout, work)
            .await
            .unwrap_or_else(|_| {
                debug!(operation, "user store deadline exceeded");
                Err(UserLifecycleError::timeout(operation))
            })
    }

    /// Run `body` in a transaction under the query deadline.
    async fn in_transaction<'a, T, F>(
        &self,
        operation: &'static str,
        body: F,
    ) -> Result<T, UserLifecycleError>
    where
        F: for<'r> FnOnce(
                &'r mut AsyncPgConnection,
            ) -> ScopedBoxFuture<'a, 'r, Result<T, UserLifecycleError>>
            + Send
            + 'a,
        T: Send + 'a,
    {
        self.bounded(operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            AsyncConnection::transaction(&mut *conn, body).await
        })
        .await
    }

    async fn find_active(
        &self,
        operation: &'static str,
        filter: UserFilter,
    ) -> Result<User, UserLifecycleError> {
        self.bounded(operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let query = users::table
                .inner_join(roles::table)
                .filter(users::is_active.eq(true))
                .select((UserRow::as_select(), RoleRow::as_select()));
            let row = match filter {
                UserFilter::Id(id) => {
                    query
                        .filter(users::id.eq(id))
                        .first::<(UserRow, RoleRow)>(&mut conn)
                        .await
                }
                UserFilter::Email(email) => {
                    query
                        .filter(users::email.eq(email))
                        .first::<(UserRow, RoleRow)>(&mut conn)
                        .await
                }
            }
            .optional()?;
            row.map(User::from).ok_or_else(UserLifecycleError::not_found)
        })
        .await
    }
}

enum UserFilter {
    Id(i64),
    Email(String),
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, UserLifecycleError> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| UserLifecycleError::query("invitation expiry out of range"))
}

#[async_trait]
impl UserLifecycleRepository for DieselUserLifecycleRepository {
    async fn create_and_invite(
        &self,
        account: &NewAccount,
        token: &InvitationToken,
        expires_in: Duration,
    ) -> Result<User, UserLifecycleError> {
        let expiry = expiry_after(self.now(), expires_in)?;
        let digest = token.digest();

        self.in_transaction("create_and_invite", |conn| {
            async move {
                let role: RoleRow = roles::table
                    .filter(roles::name.eq(account.role_name()))
                    .select(RoleRow::as_select())
                    .first::<RoleRow>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| {
                        UserLifecycleError::query(format!("unknown role {}", account.role_name()))
                    })?;

                let user: UserRow = diesel::insert_into(users::table)
                    .values(NewUserRow {
                        username: account.username(),
                        email: account.email(),
                        password: account.password().as_str(),
                        is_active: false,
                        role_id: role.id,
                    })
                    .returning(UserRow::as_returning())
                    .get_result(conn)
                    .await?;

                diesel::insert_into(user_invitations::table)
                    .values(NewInvitationRow {
                        token: digest.as_str(),
                        user_id: user.id,
                        expiry,
                    })
                    .execute(conn)
                    .await?;

                Ok(User::from((user, role)))
            }
            .scope_boxed()
        })
        .await
    }

    async fn activate(&self, token: &InvitationToken) -> Result<(), UserLifecycleError> {
        let now = self.now();
        let digest = token.digest();

        self.in_transaction("activate", |conn| {
            async move {
                // Row lock: a concurrent activation of the same token waits
                // here and then finds the invitation gone.
                let user_id: i64 = user_invitations::table
                    .filter(user_invitations::token.eq(digest.as_str()))
                    .filter(user_invitations::expiry.gt(now))
                    .select(user_invitations::user_id)
                    .for_update()
                    .first::<i64>(conn)
                    .await
                    .optional()?
                    .ok_or_else(UserLifecycleError::not_found)?;

                let updated = diesel::update(users::table.find(user_id))
                    .set(users::is_active.eq(true))
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(UserLifecycleError::not_found());
                }

                diesel::delete(
                    user_invitations::table.filter(user_invitations::user_id.eq(user_id)),
                )
                .execute(conn)
                .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserLifecycleError> {
        let raw = id.get();
        self.in_transaction("delete", |conn| {
            async move {
                let deleted = diesel::delete(users::table.find(raw))
                    .execute(conn)
                    .await?;
                if deleted == 0 {
                    return Err(UserLifecycleError::not_found());
                }
                diesel::delete(user_invitations::table.filter(user_invitations::user_id.eq(raw)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, UserLifecycleError> {
        self.find_active("find_by_id", UserFilter::Id(id.get())).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserLifecycleError> {
        let email = email.trim().to_lowercase();
        self.find_active("find_by_email", UserFilter::Email(email))
            .await
    }
}
