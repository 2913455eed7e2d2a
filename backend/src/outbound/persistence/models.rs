//! Internal Diesel row structs for the `users` table.
//!
//! These never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{DisplayName, Email, PasswordHash, StoredUser, User, UserId};

use super::schema::users;

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    #[expect(dead_code, reason = "ordering column; selected for completeness")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column; not part of the domain record")]
    pub updated_at: DateTime<Utc>,
}

/// Row inserted into `users`; timestamps use column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// Reasons a stored row cannot be turned back into a domain record.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RowDecodeError {
    #[error("invalid display name: {0}")]
    DisplayName(#[source] crate::domain::UserValidationError),
    #[error("invalid email: {0}")]
    Email(#[source] crate::domain::UserValidationError),
}

impl TryFrom<UserRow> for StoredUser {
    type Error = RowDecodeError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let display_name = DisplayName::new(row.display_name).map_err(RowDecodeError::DisplayName)?;
        let email = row
            .email
            .map(Email::new)
            .transpose()
            .map_err(RowDecodeError::Email)?;
        let user = User::new(UserId::from_uuid(row.id), display_name, email);
        Ok(StoredUser::new(
            user,
            row.password_hash.map(PasswordHash::from_encoded),
        ))
    }
}
