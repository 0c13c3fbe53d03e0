use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use moka::future::Cache;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

use crate::models::{Role, UserProfile};
use crate::{auth, AppState};

/// Extracts the token from either the __session cookie (browser clients)
/// or the Authorization header (API clients and tests)
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            // Parse cookies manually (cookie = "name=value; name2=value2")
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie.strip_prefix("__session=") {
                    return Some(value.to_string());
                }
            }
        }
    }

    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    None
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub clerk_user_id: String,
    pub email: String,
    pub profile_id: i32,
    pub role: Role,
}

type Rejection = (StatusCode, axum::Json<serde_json::Value>);

fn unauthorized(message: String) -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({ "error": message })),
    )
}

fn internal(message: &str) -> Rejection {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": message })),
    )
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = Rejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = extract_token_from_request(parts);
        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                unauthorized(
                    "Missing authentication: no __session cookie or Authorization header"
                        .to_string(),
                )
            })?;

            // Locally minted session tokens are the common case; fall back
            // to Clerk-issued bearer tokens validated against the JWKS.
            let (clerk_user_id, email) =
                match auth::validate_session_token(&token, &state.config.session_secret) {
                    Ok(claims) => (claims.sub, claims.email),
                    Err(_) => {
                        let expected_issuer = format!("https://{}", state.config.clerk_domain);
                        let claims =
                            auth::validate_clerk_jwt(&token, &state.jwks_cache, &expected_issuer)
                                .await
                                .map_err(|e| {
                                    unauthorized(format!("JWT validation failed: {}", e))
                                })?;

                        let clerk_user_id = claims.sub.clone();
                        let email = match claims.email {
                            Some(email) => email,
                            None => resolve_email(
                                &state.user_cache,
                                &clerk_user_id,
                                &state.config.clerk_secret_key,
                            )
                            .await
                            .map_err(|e| {
                                unauthorized(format!("Failed to resolve email: {}", e))
                            })?,
                        };

                        (clerk_user_id, email)
                    }
                };

            let profile = load_or_provision_profile(&state.db, &clerk_user_id, &email)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, clerk_user_id, "Profile lookup failed");
                    internal("Database error")
                })?;

            if !profile.is_active {
                tracing::warn!(profile_id = profile.id, "Deactivated profile rejected");
                return Err((
                    StatusCode::FORBIDDEN,
                    axum::Json(json!({ "error": "Account is deactivated" })),
                ));
            }

            Ok(AuthenticatedUser {
                clerk_user_id,
                email: profile.email.clone(),
                profile_id: profile.id,
                role: profile.role,
            })
        }
    }
}

/// Load the profile row for a verified identity, creating it on first
/// sight. Admin bootstrap: the very first profile in an empty system gets
/// the admin role; everyone after that starts as a plain user.
pub async fn load_or_provision_profile(
    db: &sqlx::PgPool,
    clerk_user_id: &str,
    email: &str,
) -> Result<UserProfile, sqlx::Error> {
    if let Some(profile) = sqlx::query_as::<_, UserProfile>(
        r#"SELECT * FROM "UserProfiles" WHERE auth_id = $1"#,
    )
    .bind(clerk_user_id)
    .fetch_optional(db)
    .await?
    {
        return Ok(profile);
    }

    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO "UserProfiles" (auth_id, email, role, is_active)
        VALUES (
            $1,
            $2,
            CASE
                WHEN EXISTS (SELECT 1 FROM "UserProfiles" WHERE role = 'admin') THEN 'user'
                ELSE 'admin'
            END,
            true
        )
        ON CONFLICT (auth_id) DO UPDATE SET email = EXCLUDED.email
        RETURNING *
        "#,
    )
    .bind(clerk_user_id)
    .bind(email)
    .fetch_one(db)
    .await?;

    tracing::info!(
        clerk_user_id,
        profile_id = profile.id,
        role = profile.role.as_str(),
        "Provisioned user profile"
    );

    Ok(profile)
}

async fn resolve_email(
    cache: &Cache<String, String>,
    clerk_user_id: &str,
    clerk_secret_key: &str,
) -> Result<String, crate::AppError> {
    if let Some(cached_email) = cache.get(clerk_user_id).await {
        tracing::debug!(clerk_user_id, "Email resolved from cache");
        return Ok(cached_email);
    }

    let email = auth::fetch_primary_email(clerk_user_id, clerk_secret_key).await?;

    cache.insert(clerk_user_id.to_string(), email.clone()).await;
    tracing::debug!(clerk_user_id, email = %email, "Email cached for future requests");

    Ok(email)
}
