//! Process-local `UserStore` used when no database is configured.
//!
//! Records live in a `Vec` guarded by a `tokio::sync::RwLock`, so insertion
//! order is the vector order and every port operation holds the lock for its
//! whole read-modify-write. Contents are lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    DeleteOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore, UserStoreError,
};
use crate::domain::{NewUserRecord, StoredUser, User, UserId};

/// In-memory implementation of the [`UserStore`] port.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: RwLock<Vec<StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_all(&self) -> Result<Vec<StoredUser>, UserStoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<StoredUser>, UserStoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| filter.matches(record)).cloned())
    }

    async fn insert(&self, record: NewUserRecord) -> Result<StoredUser, UserStoreError> {
        let NewUserRecord {
            display_name,
            email,
            password_hash,
        } = record;
        let stored = StoredUser::new(User::new(UserId::random(), display_name, email), password_hash);
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_one(
        &self,
        filter: &UserFilter,
        patch: &UserPatch,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, UserStoreError> {
        let mut records = self.records.write().await;

        if let Some(record) = records.iter_mut().find(|record| filter.matches(record)) {
            let id = record.user().id().clone();
            if record.user().display_name() == &patch.display_name {
                return Ok(UpdateOutcome::Unchanged { id });
            }
            record
                .user_mut()
                .set_display_name(patch.display_name.clone());
            return Ok(UpdateOutcome::Modified { id });
        }

        if !options.upsert {
            return Ok(UpdateOutcome::NotMatched);
        }

        let id = filter.id.clone().unwrap_or_else(UserId::random);
        let user = User::new(id.clone(), patch.display_name.clone(), filter.email.clone());
        records.push(StoredUser::new(user, None));
        Ok(UpdateOutcome::Upserted { id })
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<DeleteOutcome, UserStoreError> {
        let mut records = self.records.write().await;
        let deleted_count = match records.iter().position(|record| filter.matches(record)) {
            Some(index) => {
                records.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteOutcome { deleted_count })
    }
}

#[cfg(test)]
#[path = "in_memory_user_store_tests.rs"]
mod tests;
