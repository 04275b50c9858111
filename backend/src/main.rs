//! Backend entry-point: loads configuration, connects pools and serves the
//! capture portal.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use ortho_config::OrthoConfig;

use captura::config::AppConfig;
use captura::inbound::http::health::HealthState;
use captura::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use captura::outbound::procedures::connect_procedure_pool;

use server::{ServerConfig, create_server};

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

    let app_config = AppConfig::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let config = attach_pools(
        ServerConfig::new(app_config.bind_addr(), app_config.portal_settings()),
        &app_config,
    )
    .await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %app_config.bind_addr(), "captura listening");
    server.await
}

async fn attach_pools(config: ServerConfig, app_config: &AppConfig) -> std::io::Result<ServerConfig> {
    let Some(url) = app_config.database_url() else {
        warn!("CAPTURA_DATABASE_URL not set, serving fixture data");
        return Ok(config);
    };

    if app_config.run_migrations {
        let applied = run_pending_migrations(url)
            .await
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
        info!(applied, "database migrations applied");
    }

    let db_pool = DbPool::new(PoolConfig::new(url).with_max_size(app_config.pool_max_size()))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
    let procedure_pool = connect_procedure_pool(url, app_config.pool_max_size())
        .await
        .map_err(|e| std::io::Error::other(format!("procedure pool: {e}")))?;
    let lock_pool = connect_procedure_pool(url, app_config.lock_pool_max_size())
        .await
        .map_err(|e| std::io::Error::other(format!("lock pool: {e}")))?;

    Ok(config.with_db_pool(db_pool).with_procedure_pools(
        procedure_pool,
        lock_pool,
        app_config.procedure_schema(),
    ))
}
