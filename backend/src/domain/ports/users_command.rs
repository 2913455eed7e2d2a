//! Driving port for user mutations.
//!
//! Mutations other than registration take the authenticated actor so the
//! domain can refuse changes to somebody else's record.

use async_trait::async_trait;

use crate::domain::{DisplayName, Error, NewUser, User, UserId};

/// Result of a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The record existed and its display name changed.
    Updated,
    /// The record existed and already carried the requested name.
    Unchanged,
    /// No record had the id; nothing was written.
    NotFound,
    /// No record had the id; a name-only record was created under `id`.
    Upserted { id: UserId },
}

impl RenameOutcome {
    /// Records matched by the rename (0 or 1).
    pub fn matched_count(&self) -> u64 {
        u64::from(matches!(self, Self::Updated | Self::Unchanged))
    }

    /// Records whose display name changed (0 or 1).
    pub fn modified_count(&self) -> u64 {
        u64::from(matches!(self, Self::Updated))
    }

    /// Id of the record created by an upsert, if any.
    pub fn upserted_id(&self) -> Option<&UserId> {
        match self {
            Self::Upserted { id } => Some(id),
            _ => None,
        }
    }
}

/// Domain use-case port for creating, renaming, and deleting users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Hash the password and persist a new record.
    async fn create_user(&self, new_user: &NewUser) -> Result<User, Error>;

    /// Change the display name of an existing record; never inserts.
    async fn rename_existing(
        &self,
        actor: &UserId,
        id: &UserId,
        display_name: DisplayName,
    ) -> Result<RenameOutcome, Error>;

    /// Change the display name, creating a name-only record when `id` is
    /// unknown.
    async fn create_or_replace(
        &self,
        actor: &UserId,
        id: &UserId,
        display_name: DisplayName,
    ) -> Result<RenameOutcome, Error>;

    /// Remove the record; returns the number of records deleted (0 or 1).
    async fn delete_user(&self, actor: &UserId, id: &UserId) -> Result<u64, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RenameOutcome::Updated, 1, 1, false)]
    #[case(RenameOutcome::Unchanged, 1, 0, false)]
    #[case(RenameOutcome::NotFound, 0, 0, false)]
    #[case(RenameOutcome::Upserted { id: UserId::random() }, 0, 0, true)]
    fn counts_follow_the_outcome(
        #[case] outcome: RenameOutcome,
        #[case] matched: u64,
        #[case] modified: u64,
        #[case] upserted: bool,
    ) {
        assert_eq!(outcome.matched_count(), matched);
        assert_eq!(outcome.modified_count(), modified);
        assert_eq!(outcome.upserted_id().is_some(), upserted);
    }
}
