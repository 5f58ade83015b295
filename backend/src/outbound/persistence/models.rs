//! Row types for the user lifecycle tables.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{roles, user_invitations, users};
use crate::domain::{PasswordHash, Role, User, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub level: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub role_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub is_active: bool,
    pub role_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub token: &'a str,
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            level: row.level,
        }
    }
}

impl From<(UserRow, RoleRow)> for User {
    fn from((user, role): (UserRow, RoleRow)) -> Self {
        Self {
            id: UserId::new(user.id),
            username: user.username,
            email: user.email,
            password: PasswordHash::from_encoded(user.password),
            created_at: user.created_at,
            is_active: user.is_active,
            role_id: user.role_id,
            role: role.into(),
        }
    }
}
