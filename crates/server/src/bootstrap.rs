use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use comparcar_core::config::{AppConfig, ConfigError, LoadOptions};
use comparcar_db::repositories::SqlCarRepository;
use comparcar_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::CatalogService;
use crate::{cars, health};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: Arc<CatalogService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("server.cors_allowed_origin `{origin}` is not a valid header value")]
    CorsOrigin { origin: String },
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        max_connections = config.database.max_connections,
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = Arc::new(CatalogService::new(Arc::new(SqlCarRepository::new(db_pool.clone()))));

    Ok(Application { config, db_pool, catalog })
}

impl Application {
    /// Catalog and health routes behind CORS and request tracing.
    pub fn router(&self) -> Result<Router, BootstrapError> {
        let origin = &self.config.server.cors_allowed_origin;
        let allowed_origin = HeaderValue::from_str(origin)
            .map_err(|_| BootstrapError::CorsOrigin { origin: origin.clone() })?;

        let cors = CorsLayer::new()
            .allow_origin(allowed_origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]);

        Ok(cars::router(self.catalog.clone())
            .merge(health::router(self.db_pool.clone()))
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }
}
