mod auth;
mod config;
mod db;
mod error;
mod extractors;
mod forms;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;
mod storage;

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use auth::JwksCache;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub jwks_cache: Arc<JwksCache>,
    pub user_cache: Cache<String, String>, // clerk_user_id → email
    pub storage: Arc<dyn storage::ObjectStore>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

/// LOG_FORMAT=json switches to structured output for log aggregation.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,journalhub_axum=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let db = db::create_pool(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to create database pool: {}", e);
        e
    })?;
    db::run_migrations(&db).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        e
    })?;
    tracing::info!("Database ready");

    // The recorder must be installed before the first metric is emitted
    let metrics_state = Arc::new(handlers::setup_metrics_recorder());

    let jwks_cache = Arc::new(JwksCache::new(&config.clerk_domain));

    // Short-lived clerk_user_id → email mapping, avoids a platform API
    // round trip per bearer-token request
    let user_cache = Cache::builder()
        .time_to_live(Duration::from_secs(300))
        .max_capacity(10_000)
        .build();

    let store = Arc::new(storage::HttpObjectStore::new(
        &config.storage_base_url,
        &config.storage_signing_key,
    ));

    let state = Arc::new(AppState {
        db,
        jwks_cache,
        user_cache,
        storage: store,
        config,
        metrics: metrics_state,
    });

    let app = startup::build_router(state);

    let listener = TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
