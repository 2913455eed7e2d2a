//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::outbound::deadline::DEFAULT_STORE_TIMEOUT;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) pool_max_size: u32,
    pub(crate) store_timeout: Duration,
    pub(crate) password_pepper: Option<Vec<u8>>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Session and binding settings; stores default to in-memory.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            database_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            password_pepper: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Persist users in Postgres at `database_url` instead of memory.
    #[must_use]
    pub fn with_database(mut self, database_url: impl Into<String>, pool_max_size: u32) -> Self {
        self.database_url = Some(database_url.into());
        self.pool_max_size = pool_max_size;
        self
    }

    /// Bound every store call by `timeout`.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_password_pepper(mut self, pepper: Option<&[u8]>) -> Self {
        self.password_pepper = pepper.map(<[u8]>::to_vec);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
