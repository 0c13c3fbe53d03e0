use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::AppState;

#[derive(Serialize)]
pub struct DebugInfo {
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub database_status: String,
    pub database_connections: u32,
    pub clerk_domain: String,
    pub storage_base_url: String,
    pub timestamp: u64,
}

/// Global start time for uptime calculation
static START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Handler for the /api/debug/config endpoint (behind X-Debug-Key).
/// Secrets are never echoed, only connectivity and addressing.
pub async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<DebugInfo> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => format!("unreachable: {}", e),
    };

    let info = DebugInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string()),
        uptime_seconds: START_TIME.elapsed().unwrap_or_default().as_secs(),
        database_status,
        database_connections: state.db.size(),
        clerk_domain: state.config.clerk_domain.clone(),
        storage_base_url: state.config.storage_base_url.clone(),
        timestamp: SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs(),
    };

    Json(info)
}
