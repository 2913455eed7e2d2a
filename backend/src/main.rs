//! Service entry-point: loads settings, initialises logging, and runs the server.

use actix_web::cookie::SameSite;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use registration::inbound::http::health::HealthState;
use registration::server::{AppSettings, ServerConfig, create_server, load_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let allow_ephemeral = cfg!(debug_assertions) || settings.session_allow_ephemeral;
    let key = load_session_key(&settings.session_key_file(), allow_ephemeral)
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure(),
        SameSite::Lax,
        settings.bind_addr()?,
    )
    .with_store_timeout(settings.store_timeout())
    .with_password_pepper(settings.password_pepper());
    if let Some(url) = settings.database_url()? {
        config = config.with_database(url, settings.db_pool_max_size());
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
