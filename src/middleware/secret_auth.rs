use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::AppState;

const DEBUG_KEY_HEADER: &str = "X-Debug-Key";

/// Gates the debug endpoints behind a shared secret. The comparison is
/// constant-time so response latency leaks nothing about the key.
pub async fn require_debug_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = match request
        .headers()
        .get(DEBUG_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(v) => v,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    let expected = state.config.debug_key.as_bytes();
    if bool::from(expected.ct_eq(provided.as_bytes())) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rejected debug request with invalid key");
        Err(StatusCode::UNAUTHORIZED)
    }
}
