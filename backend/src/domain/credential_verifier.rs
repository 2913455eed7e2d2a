//! Credential verification against stored user records.
//!
//! A claimed identity (email) is looked up in the store and the presented
//! secret is checked against the stored Argon2id hash. Unknown identities,
//! records without a credential, and wrong secrets are indistinguishable to
//! callers: each yields "no match", and each performs one full hash
//! verification.

use std::sync::Arc;

use tracing::warn;

use super::ports::{UserFilter, UserStore};
use super::user_service::map_store_error;
use super::{CredentialHasher, Email, Error, Password, PasswordHash, UserId};

/// Decides match / no-match for an email and secret.
pub struct CredentialVerifier<S: ?Sized> {
    store: Arc<S>,
    hasher: CredentialHasher,
}

impl<S: ?Sized> Clone for CredentialVerifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: self.hasher.clone(),
        }
    }
}

impl<S> CredentialVerifier<S>
where
    S: UserStore + ?Sized,
{
    pub fn new(store: Arc<S>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// Whether `secret` matches the credential stored for `email`.
    ///
    /// Absence of the identity is `Ok(false)`; only store failures are errors.
    pub async fn verify(&self, email: &str, secret: &Password) -> Result<bool, Error> {
        Ok(self.authenticate(email, secret).await?.is_some())
    }

    /// Id of the record whose credential matches, or `None`.
    pub async fn authenticate(
        &self,
        email: &str,
        secret: &Password,
    ) -> Result<Option<UserId>, Error> {
        let record = match Email::new(email) {
            Ok(email) => self
                .store
                .find_one(&UserFilter::by_email(email))
                .await
                .map_err(map_store_error)?,
            Err(_) => None,
        };

        let Some(record) = record else {
            self.check(secret.clone(), None).await?;
            return Ok(None);
        };

        let stored = record.password_hash().cloned();
        let matched = self.check(secret.clone(), stored).await?;
        Ok(matched.then(|| record.user().id().clone()))
    }

    async fn check(&self, secret: Password, stored: Option<PasswordHash>) -> Result<bool, Error> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify_password(&secret, &hash).unwrap_or_else(|err| {
                warn!(error = %err, "stored credential could not be parsed");
                false
            }),
            None => hasher.verify_against_dummy(&secret),
        })
        .await
        .map_err(|err| Error::internal(format!("credential check task failed: {err}")))
    }
}
