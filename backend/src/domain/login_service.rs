//! Login use-case backed by the credential verifier.

use async_trait::async_trait;
use tracing::info;

use super::ports::{LoginService, UserStore};
use super::{CredentialVerifier, Error, LoginCredentials, UserId};

/// [`LoginService`] that checks credentials against the user store.
pub struct CredentialLoginService<S: ?Sized> {
    verifier: CredentialVerifier<S>,
}

impl<S: ?Sized> CredentialLoginService<S> {
    pub fn new(verifier: CredentialVerifier<S>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl<S> LoginService for CredentialLoginService<S>
where
    S: UserStore + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        match self
            .verifier
            .authenticate(credentials.email(), credentials.password())
            .await?
        {
            Some(id) => {
                info!(user_id = %id, "login succeeded");
                Ok(id)
            }
            None => {
                info!("login rejected");
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }
}
