//! Server entry-point: loads settings, prepares storage, and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use grievances::inbound::http::health::HealthState;
use grievances::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppConfig, ServerConfig, create_server};

/// Open the pool and bring the schema up to date.
async fn connect_database(config: &AppConfig, url: &str) -> color_eyre::Result<DbPool> {
    run_pending_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let mut pool_config = PoolConfig::new(url);
    if let Some(size) = config.db_pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    DbPool::new(pool_config)
        .await
        .wrap_err("failed to open database pool")
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config = AppConfig::load_from_iter(std::env::args_os())
        .wrap_err("failed to load configuration")?;
    let mut config = ServerConfig::from_app_config(&app_config, cfg!(debug_assertions))
        .wrap_err("invalid configuration")?;

    if let Some(url) = app_config.database_url.as_deref() {
        let pool = connect_database(&app_config, url).await?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::metrics::build_prometheus()?));
    }

    info!(bind_addr = %config.bind_addr(), "starting grievances server");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}
