//! Bounded per-call timeout for any `UserStore`.
//!
//! Wraps another store and fails a call with `UserStoreError::Unavailable`
//! once the deadline elapses. The inner future is dropped on timeout; an
//! in-flight database statement may still complete server-side.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use crate::domain::ports::{
    DeleteOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore, UserStoreError,
};
use crate::domain::{NewUserRecord, StoredUser};

/// Default bound applied to each store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// [`UserStore`] decorator enforcing a per-call deadline.
pub struct DeadlineUserStore<S: ?Sized> {
    inner: Arc<S>,
    limit: Duration,
}

impl<S: ?Sized> DeadlineUserStore<S> {
    pub fn new(inner: Arc<S>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, UserStoreError>
    where
        F: Future<Output = Result<T, UserStoreError>> + Send,
    {
        match timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                let millis = self.limit.as_millis();
                warn!(operation, timeout_ms = %millis, "user store call timed out");
                Err(UserStoreError::unavailable(format!(
                    "{operation} timed out after {millis} ms"
                )))
            }
        }
    }
}

#[async_trait]
impl<S> UserStore for DeadlineUserStore<S>
where
    S: UserStore + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<StoredUser>, UserStoreError> {
        self.bounded("find_all", self.inner.find_all()).await
    }

    async fn find_one(&self, filter: &UserFilter) -> Result<Option<StoredUser>, UserStoreError> {
        self.bounded("find_one", self.inner.find_one(filter)).await
    }

    async fn insert(&self, record: NewUserRecord) -> Result<StoredUser, UserStoreError> {
        self.bounded("insert", self.inner.insert(record)).await
    }

    async fn update_one(
        &self,
        filter: &UserFilter,
        patch: &UserPatch,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, UserStoreError> {
        self.bounded("update_one", self.inner.update_one(filter, patch, options))
            .await
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<DeleteOutcome, UserStoreError> {
        self.bounded("delete_one", self.inner.delete_one(filter)).await
    }
}
