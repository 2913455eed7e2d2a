//! User management domain service.
//!
//! Implements the `UsersQuery` and `UsersCommand` driving ports on top of a
//! [`UserStore`]. The service holds no state of its own: every operation is a
//! single store call, and consistency between racing requests on the same id
//! is whatever the store's single-record atomicity provides.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::ports::{
    RenameOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore,
    UserStoreError, UsersCommand, UsersQuery,
};
use crate::domain::{
    CredentialHasher, DisplayName, Email, Error, NewUser, NewUserRecord, User, UserId,
};

/// Message returned to clients whenever the store fails.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "user store unavailable";

/// Translate a store failure into a domain error.
///
/// The adapter message is logged and withheld from the response.
pub(crate) fn map_store_error(err: UserStoreError) -> Error {
    error!(error = %err, "user store call failed");
    Error::service_unavailable(STORE_UNAVAILABLE_MESSAGE)
}

/// User service implementing the user driving ports.
pub struct UserService<S: ?Sized> {
    store: Arc<S>,
    hasher: CredentialHasher,
}

impl<S: ?Sized> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: self.hasher.clone(),
        }
    }
}

impl<S> UserService<S>
where
    S: UserStore + ?Sized,
{
    /// Create a new service over `store`, hashing new credentials with
    /// `hasher`.
    pub fn new(store: Arc<S>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    fn ensure_actor(actor: &UserId, id: &UserId) -> Result<(), Error> {
        if actor == id {
            Ok(())
        } else {
            Err(Error::forbidden("cannot modify another user's record"))
        }
    }

    async fn rename(
        &self,
        actor: &UserId,
        id: &UserId,
        display_name: DisplayName,
        upsert: bool,
    ) -> Result<RenameOutcome, Error> {
        Self::ensure_actor(actor, id)?;
        let outcome = self
            .store
            .update_one(
                &UserFilter::by_id(id.clone()),
                &UserPatch { display_name },
                UpdateOptions { upsert },
            )
            .await
            .map_err(map_store_error)?;

        Ok(match outcome {
            UpdateOutcome::Modified { .. } => RenameOutcome::Updated,
            UpdateOutcome::Unchanged { .. } => RenameOutcome::Unchanged,
            UpdateOutcome::NotMatched => RenameOutcome::NotFound,
            UpdateOutcome::Upserted { id } => {
                info!(user_id = %id, "user record created by rename");
                RenameOutcome::Upserted { id }
            }
        })
    }
}

#[async_trait]
impl<S> UsersQuery for UserService<S>
where
    S: UserStore + ?Sized,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        let records = self.store.find_all().await.map_err(map_store_error)?;
        Ok(records.into_iter().map(|record| record.into_user()).collect())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, Error> {
        let record = self
            .store
            .find_one(&UserFilter::by_email(email.clone()))
            .await
            .map_err(map_store_error)?;
        Ok(record.map(|record| record.into_user()))
    }
}

#[async_trait]
impl<S> UsersCommand for UserService<S>
where
    S: UserStore + ?Sized,
{
    async fn create_user(&self, new_user: &NewUser) -> Result<User, Error> {
        let hasher = self.hasher.clone();
        let password = new_user.password().clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        let stored = self
            .store
            .insert(NewUserRecord {
                display_name: new_user.display_name().clone(),
                email: Some(new_user.email().clone()),
                password_hash: Some(password_hash),
            })
            .await
            .map_err(map_store_error)?;
        info!(user_id = %stored.user().id(), "user registered");
        Ok(stored.into_user())
    }

    async fn rename_existing(
        &self,
        actor: &UserId,
        id: &UserId,
        display_name: DisplayName,
    ) -> Result<RenameOutcome, Error> {
        self.rename(actor, id, display_name, false).await
    }

    async fn create_or_replace(
        &self,
        actor: &UserId,
        id: &UserId,
        display_name: DisplayName,
    ) -> Result<RenameOutcome, Error> {
        self.rename(actor, id, display_name, true).await
    }

    async fn delete_user(&self, actor: &UserId, id: &UserId) -> Result<u64, Error> {
        Self::ensure_actor(actor, id)?;
        let outcome = self
            .store
            .delete_one(&UserFilter::by_id(id.clone()))
            .await
            .map_err(map_store_error)?;
        if outcome.deleted_count > 0 {
            info!(user_id = %id, "user deleted");
        }
        Ok(outcome.deleted_count)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
