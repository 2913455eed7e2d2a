//! Builders for the user store and the HTTP state that depends on it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::UserStore;
use crate::domain::{CredentialHasher, CredentialLoginService, CredentialVerifier, UserService};
use crate::inbound::http::state::HttpState;
use crate::outbound::deadline::DeadlineUserStore;
use crate::outbound::memory::InMemoryUserStore;
use crate::outbound::persistence::{DbPool, DieselUserStore, PoolConfig, run_pending_migrations};

use super::ServerConfig;

/// Build the process-wide user store.
///
/// Uses Postgres when a database URL is configured (after applying pending
/// migrations), otherwise an in-memory store. Either way the result is
/// wrapped in a [`DeadlineUserStore`].
///
/// # Errors
/// Returns [`std::io::Error`] when migrations fail or the pool cannot be
/// built.
pub async fn build_user_store(config: &ServerConfig) -> std::io::Result<Arc<dyn UserStore>> {
    let inner: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
            let pool = DbPool::new(PoolConfig::new(url.clone()).with_max_size(config.pool_max_size))
                .await
                .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
            info!(max_size = config.pool_max_size, "using postgres user store");
            Arc::new(DieselUserStore::new(pool))
        }
        None => {
            warn!("no database configured; users are kept in memory and lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };
    Ok(Arc::new(DeadlineUserStore::new(inner, config.store_timeout)))
}

/// Build the Argon2 hasher, mixing in the configured pepper.
///
/// # Errors
/// Returns [`std::io::Error`] when the pepper is rejected by Argon2.
pub fn build_hasher(config: &ServerConfig) -> std::io::Result<CredentialHasher> {
    CredentialHasher::new(config.password_pepper.as_deref())
        .map_err(|err| std::io::Error::other(format!("password hasher: {err}")))
}

/// Wire the domain services over `store` into handler state.
pub fn build_http_state(store: Arc<dyn UserStore>, hasher: CredentialHasher) -> HttpState {
    let users = Arc::new(UserService::new(store.clone(), hasher.clone()));
    let login = Arc::new(CredentialLoginService::new(CredentialVerifier::new(
        store, hasher,
    )));
    HttpState::new(login, users.clone(), users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoginCredentials, NewUser, fast_test_hasher};
    use actix_web::cookie::{Key, SameSite};

    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("literal address"),
        )
    }

    #[tokio::test]
    async fn without_a_database_the_store_is_in_memory() {
        let store = build_user_store(&memory_config())
            .await
            .expect("memory store builds");
        assert!(store.find_all().await.expect("empty list").is_empty());
    }

    #[tokio::test]
    async fn wired_state_logs_in_a_registered_user() {
        let store = build_user_store(&memory_config())
            .await
            .expect("memory store builds");
        let state = build_http_state(store, fast_test_hasher());

        let new_user = NewUser::try_from_parts("Ahnaf", "a@x.com", "p1").expect("valid user");
        let created = state
            .users_command
            .create_user(&new_user)
            .await
            .expect("create succeeds");

        let credentials = LoginCredentials::try_from_parts("a@x.com", "p1").expect("shape");
        let id = state
            .login
            .authenticate(&credentials)
            .await
            .expect("login succeeds");
        assert_eq!(&id, created.id());
    }

    #[test]
    fn hasher_accepts_a_pepper() {
        let config = memory_config().with_password_pepper(Some(b"pepper"));
        assert!(build_hasher(&config).is_ok());
    }
}
