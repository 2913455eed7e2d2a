//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to read user records
//! without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Email, Error, User};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every user record, credentials stripped.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// First user registered under `email`, or `None`.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, Error>;
}
