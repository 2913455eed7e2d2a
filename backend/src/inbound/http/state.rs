//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use registration::domain::{
    ///     CredentialHasher, CredentialLoginService, CredentialVerifier, UserService,
    /// };
    /// use registration::inbound::http::state::HttpState;
    /// use registration::outbound::memory::InMemoryUserStore;
    ///
    /// let store = Arc::new(InMemoryUserStore::new());
    /// let hasher = CredentialHasher::new(None).expect("default parameters");
    /// let service = Arc::new(UserService::new(store.clone(), hasher.clone()));
    /// let login = CredentialLoginService::new(CredentialVerifier::new(store, hasher));
    ///
    /// let state = HttpState::new(Arc::new(login), service.clone(), service);
    /// let _users = state.users.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
    ) -> Self {
        Self {
            login,
            users,
            users_command,
        }
    }
}
