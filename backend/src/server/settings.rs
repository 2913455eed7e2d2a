//! Process settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `REGISTRATION_*` environment variables over
//! defaults. A bare `PORT` variable is honoured when no explicit port is set.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Runtime configuration for the registration service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Listening port; falls back to `PORT`, then 5000.
    pub port: Option<u16>,
    /// Full Postgres URL; takes precedence over the `db_*` components.
    pub database_url: Option<String>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_host: Option<String>,
    pub db_database: Option<String>,
    /// Upper bound for a single store call, in milliseconds.
    pub store_timeout_ms: Option<u64>,
    pub db_pool_max_size: Option<u32>,
    /// Path to the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Drop the `Secure` flag from the session cookie (plain-HTTP dev only).
    #[ortho_config(default = false)]
    pub cookie_insecure: bool,
    /// Secret mixed into every password hash.
    pub password_pepper: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &redact(&self.database_url))
            .field("db_user", &self.db_user)
            .field("db_pass", &redact(&self.db_pass))
            .field("db_host", &self.db_host)
            .field("db_database", &self.db_database)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("db_pool_max_size", &self.db_pool_max_size)
            .field("session_key_file", &self.session_key_file)
            .field("session_allow_ephemeral", &self.session_allow_ephemeral)
            .field("cookie_insecure", &self.cookie_insecure)
            .field("password_pepper", &redact(&self.password_pepper))
            .finish()
    }
}

impl AppSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// The configured port, else `PORT`, else 5000.
    pub fn port(&self) -> u16 {
        self.port_with_fallback(std::env::var("PORT").ok().as_deref())
    }

    fn port_with_fallback(&self, fallback: Option<&str>) -> u16 {
        self.port
            .or_else(|| fallback.and_then(|raw| raw.trim().parse().ok()))
            .unwrap_or(DEFAULT_PORT)
    }

    /// Socket address built from [`Self::host`] and [`Self::port`].
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let host = self.host();
        let ip: IpAddr = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid bind address {host:?}: {err}")))?;
        Ok(SocketAddr::new(ip, self.port()))
    }

    /// Connection URL, or `None` to run against the in-memory store.
    ///
    /// Components are used when no full URL is given; both `db_user` and
    /// `db_database` must be present for that. User, password, and database
    /// name are percent-encoded.
    ///
    /// # Errors
    /// Fails when `db_host` does not form a valid URL authority.
    pub fn database_url(&self) -> std::io::Result<Option<String>> {
        if let Some(url) = self.database_url.as_ref().filter(|url| !url.trim().is_empty()) {
            return Ok(Some(url.clone()));
        }
        let (Some(user), Some(database)) = (self.db_user.as_deref(), self.db_database.as_deref())
        else {
            return Ok(None);
        };
        let host = self.db_host.as_deref().unwrap_or(DEFAULT_DB_HOST);
        let invalid = |what: &str| std::io::Error::other(format!("invalid database {what}"));

        let mut url = Url::parse(&format!("postgres://{host}/"))
            .map_err(|err| std::io::Error::other(format!("invalid database host {host:?}: {err}")))?;
        url.set_username(user).map_err(|()| invalid("user"))?;
        url.set_password(self.db_pass.as_deref())
            .map_err(|()| invalid("password"))?;
        url.path_segments_mut()
            .map_err(|()| invalid("name"))?
            .clear()
            .push(database);
        Ok(Some(url.into()))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn db_pool_max_size(&self) -> u32 {
        self.db_pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Session cookies carry `Secure` unless `cookie_insecure` is set.
    pub fn cookie_secure(&self) -> bool {
        !self.cookie_insecure
    }

    pub fn password_pepper(&self) -> Option<&[u8]> {
        self.password_pepper
            .as_deref()
            .filter(|pepper| !pepper.is_empty())
            .map(str::as_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 13] = [
        "REGISTRATION_HOST",
        "REGISTRATION_PORT",
        "REGISTRATION_DATABASE_URL",
        "REGISTRATION_DB_USER",
        "REGISTRATION_DB_PASS",
        "REGISTRATION_DB_HOST",
        "REGISTRATION_DB_DATABASE",
        "REGISTRATION_STORE_TIMEOUT_MS",
        "REGISTRATION_DB_POOL_MAX_SIZE",
        "REGISTRATION_SESSION_KEY_FILE",
        "REGISTRATION_SESSION_ALLOW_EPHEMERAL",
        "REGISTRATION_COOKIE_INSECURE",
        "REGISTRATION_PASSWORD_PEPPER",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let vars = VARS.iter().map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| (*value).to_owned());
            (*name, value)
        });
        let _guard = lock_env(vars.chain([("PORT", None::<String>)]));
        AppSettings::load_from_iter([OsString::from("registration")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let settings = load_with(&[]);
        assert_eq!(settings.host(), DEFAULT_HOST);
        assert_eq!(settings.port_with_fallback(None), DEFAULT_PORT);
        assert_eq!(settings.database_url().expect("no url"), None);
        assert_eq!(settings.store_timeout(), Duration::from_millis(5_000));
        assert_eq!(settings.db_pool_max_size(), 10);
        assert!(settings.cookie_secure());
        assert!(!settings.session_allow_ephemeral);
        assert!(settings.password_pepper().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("REGISTRATION_HOST", "127.0.0.1"),
            ("REGISTRATION_PORT", "8088"),
            ("REGISTRATION_STORE_TIMEOUT_MS", "250"),
            ("REGISTRATION_COOKIE_INSECURE", "true"),
            ("REGISTRATION_PASSWORD_PEPPER", "pepper"),
        ]);
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            "127.0.0.1:8088".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.store_timeout(), Duration::from_millis(250));
        assert!(!settings.cookie_secure());
        assert_eq!(settings.password_pepper(), Some(&b"pepper"[..]));
    }

    #[rstest]
    #[case(None, 5000)]
    #[case(Some("7000"), 7000)]
    #[case(Some("not-a-port"), 5000)]
    fn plain_port_is_a_fallback(#[case] fallback: Option<&str>, #[case] expected: u16) {
        let settings = load_with(&[]);
        assert_eq!(settings.port_with_fallback(fallback), expected);
    }

    #[rstest]
    fn explicit_port_beats_plain_port() {
        let settings = load_with(&[("REGISTRATION_PORT", "9000")]);
        assert_eq!(settings.port_with_fallback(Some("7000")), 9000);
    }

    #[rstest]
    #[case(
        &[("REGISTRATION_DB_USER", "app"), ("REGISTRATION_DB_PASS", "pw"), ("REGISTRATION_DB_DATABASE", "users")],
        Some("postgres://app:pw@localhost/users")
    )]
    #[case(
        &[("REGISTRATION_DB_USER", "app"), ("REGISTRATION_DB_HOST", "db"), ("REGISTRATION_DB_DATABASE", "users")],
        Some("postgres://app@db/users")
    )]
    #[case(&[("REGISTRATION_DB_USER", "app")], None)]
    #[case(
        &[("REGISTRATION_DATABASE_URL", "postgres://full/url"), ("REGISTRATION_DB_USER", "ignored"), ("REGISTRATION_DB_DATABASE", "x")],
        Some("postgres://full/url")
    )]
    fn database_url_is_composed_from_parts(
        #[case] overrides: &[(&str, &str)],
        #[case] expected: Option<&str>,
    ) {
        let settings = load_with(overrides);
        assert_eq!(
            settings.database_url().expect("url builds").as_deref(),
            expected
        );
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let settings = load_with(&[
            ("REGISTRATION_DB_PASS", "hunter2"),
            ("REGISTRATION_PASSWORD_PEPPER", "s3cr3t-spice"),
        ]);
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cr3t-spice"));
    }

    #[rstest]
    fn cookies_are_secure_unless_explicitly_relaxed() {
        let settings = load_with(&[]);
        assert!(!settings.cookie_insecure);
        assert!(settings.cookie_secure());
    }

    #[rstest]
    fn credentials_with_reserved_characters_are_encoded() {
        let settings = load_with(&[
            ("REGISTRATION_DB_USER", "app"),
            ("REGISTRATION_DB_PASS", "p@ss/w#rd"),
            ("REGISTRATION_DB_HOST", "db.internal"),
            ("REGISTRATION_DB_DATABASE", "users"),
        ]);
        let raw = settings
            .database_url()
            .expect("url builds")
            .expect("url configured");
        assert!(!raw.contains("p@ss/w#rd"));

        let url = Url::parse(&raw).expect("composed url parses");
        assert_eq!(url.host_str(), Some("db.internal"));
        assert_eq!(url.username(), "app");
        assert_eq!(url.password(), Some("p%40ss%2Fw%23rd"));
        assert_eq!(url.path(), "/users");
    }

    #[rstest]
    #[case("::", "[::]:5000")]
    #[case("[::1]", "[::1]:5000")]
    #[case("0.0.0.0", "0.0.0.0:5000")]
    fn bind_addr_accepts_ipv4_and_ipv6_hosts(#[case] host: &str, #[case] expected: &str) {
        let settings = load_with(&[("REGISTRATION_HOST", host), ("REGISTRATION_PORT", "5000")]);
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            expected.parse::<SocketAddr>().expect("literal")
        );
    }

    #[rstest]
    fn hostnames_are_rejected_as_bind_addresses() {
        let settings = load_with(&[("REGISTRATION_HOST", "localhost")]);
        assert!(settings.bind_addr().is_err());
    }
}
