use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth,
    extractors::{auth::load_or_provision_profile, AuthenticatedUser},
    models::UserProfile,
    AppResult, AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignInResponse {
    pub token: String,
    pub profile: UserProfile,
}

/// POST /api/auth/sign-in
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; session token issued", body = SignInResponse),
        (status = 404, description = "No account for that email"),
        (status = 401, description = "Incorrect password"),
        (status = 422, description = "Malformed email address")
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignInRequest>,
) -> AppResult<Json<SignInResponse>> {
    let identity = auth::verify_password(
        &payload.email,
        &payload.password,
        &state.config.clerk_secret_key,
    )
    .await?;

    let profile =
        load_or_provision_profile(&state.db, &identity.clerk_user_id, &identity.email).await?;

    let token = auth::issue_session_token(
        &identity.clerk_user_id,
        &identity.email,
        &state.config.session_secret,
    )?;

    tracing::info!(profile_id = profile.id, "User signed in");

    Ok(Json(SignInResponse { token, profile }))
}

/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current authenticated profile", body = UserProfile),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("cookie_auth" = []))
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"SELECT * FROM "UserProfiles" WHERE id = $1"#,
    )
    .bind(auth.profile_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignOutResponse {
    pub success: bool,
}

/// POST /api/auth/sign-out
///
/// Sessions are stateless JWTs, so sign-out is an acknowledgement; the
/// client discards its token.
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = SignOutResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("cookie_auth" = []))
)]
pub async fn sign_out(auth: AuthenticatedUser) -> Json<SignOutResponse> {
    tracing::info!(profile_id = auth.profile_id, "User signed out");
    Json(SignOutResponse { success: true })
}
