use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{handlers, middleware, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    // Auth routes
    let auth_routes = Router::new()
        .route("/sign-in", post(handlers::auth_handler::sign_in))
        .route("/sign-out", post(handlers::auth_handler::sign_out))
        .route("/me", get(handlers::auth_handler::get_me));

    // Journal routes
    let journal_routes = Router::new()
        .route("/", get(handlers::journals_handler::get_journals))
        .route("/", post(handlers::journals_handler::create_journal))
        .route("/{id}", get(handlers::journals_handler::get_journal))
        .route("/{id}", put(handlers::journals_handler::update_journal))
        .route("/{id}", delete(handlers::journals_handler::delete_journal));

    // Entry routes
    let entry_routes = Router::new()
        .route("/", get(handlers::entries_handler::get_entries))
        .route("/", post(handlers::entries_handler::create_entry))
        .route("/{id}", get(handlers::entries_handler::get_entry))
        .route("/{id}", put(handlers::entries_handler::update_entry))
        .route("/{id}", delete(handlers::entries_handler::delete_entry));

    // Template routes (marketplace browse + forms + management)
    let template_routes = Router::new()
        .route("/", get(handlers::templates_handler::get_templates))
        .route("/", post(handlers::templates_handler::create_template))
        .route("/{id}", get(handlers::templates_handler::get_template))
        .route("/{id}", put(handlers::templates_handler::update_template))
        .route("/{id}", delete(handlers::templates_handler::delete_template))
        .route("/{id}/form", get(handlers::templates_handler::get_template_form))
        .route(
            "/{id}/submissions",
            post(handlers::templates_handler::submit_template_form),
        );

    // Admin routes
    let admin_routes = Router::new()
        .route("/users", get(handlers::users_handler::get_users))
        .route("/users/{id}", get(handlers::users_handler::get_user))
        .route("/users/{id}", put(handlers::users_handler::update_user))
        .route("/users/{id}", delete(handlers::users_handler::delete_user))
        .route("/users/{id}/role", put(handlers::users_handler::update_role))
        .route("/stats", get(handlers::users_handler::get_stats));

    // Debug routes, gated by X-Debug-Key
    let debug_routes = Router::new()
        .route("/config", get(handlers::debug::debug_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_debug_key,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/journals", journal_routes)
        .nest("/api/entries", entry_routes)
        .nest("/api/templates", template_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/debug", debug_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(from_fn(middleware::track_http_metrics))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
