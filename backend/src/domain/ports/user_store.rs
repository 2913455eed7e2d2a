//! Driven port for user record persistence.
//!
//! The store is the only stateful component. Each operation is atomic on a
//! single record; the service layer performs no locking of its own and makes
//! no multi-record guarantees. "Not found" is always a regular outcome, never
//! an error.

use async_trait::async_trait;

use crate::domain::{DisplayName, Email, NewUserRecord, StoredUser, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user store adapters.
    pub enum UserStoreError {
        /// The backend could not be reached or did not answer in time.
        Unavailable { message: String } => "user store unavailable: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Equality filter over user fields; every present field must match.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<Email>,
    pub display_name: Option<DisplayName>,
}

impl UserFilter {
    /// Match the record with the given id.
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Match records with the given email.
    pub fn by_email(email: Email) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }

    /// Whether `record` satisfies every populated field.
    pub fn matches(&self, record: &StoredUser) -> bool {
        let user = record.user();
        self.id.as_ref().is_none_or(|id| user.id() == id)
            && self
                .email
                .as_ref()
                .is_none_or(|email| user.email() == Some(email))
            && self
                .display_name
                .as_ref()
                .is_none_or(|name| user.display_name() == name)
    }
}

/// Field changes applied by [`UserStore::update_one`].
///
/// Only the display name is mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub display_name: DisplayName,
}

/// Options for [`UserStore::update_one`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a record built from the filter and patch when nothing matches.
    pub upsert: bool,
}

/// Result of [`UserStore::update_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No record matched and upsert was off.
    NotMatched,
    /// A record matched and already held the patched values.
    Unchanged { id: UserId },
    /// A record matched and was modified.
    Modified { id: UserId },
    /// No record matched; a new one was inserted under `id`.
    Upserted { id: UserId },
}

/// Result of [`UserStore::delete_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Number of records removed: 0 or 1.
    pub deleted_count: u64,
}

/// Durable keyed collection of user records.
///
/// Implementations must be safe to share across request tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every stored record, in insertion order.
    async fn find_all(&self) -> Result<Vec<StoredUser>, UserStoreError>;

    /// First record (in insertion order) matching `filter`.
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<StoredUser>, UserStoreError>;

    /// Assign a fresh id, persist the record, and return it.
    async fn insert(&self, record: NewUserRecord) -> Result<StoredUser, UserStoreError>;

    /// Apply `patch` to the first record matching `filter`.
    ///
    /// With `options.upsert`, an unmatched filter inserts a record carrying
    /// the filter's `id` (or a fresh id when the filter has none), the
    /// filter's `email`, and the patched display name.
    async fn update_one(
        &self,
        filter: &UserFilter,
        patch: &UserPatch,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, UserStoreError>;

    /// Remove the first record matching `filter`.
    async fn delete_one(&self, filter: &UserFilter) -> Result<DeleteOutcome, UserStoreError>;
}
