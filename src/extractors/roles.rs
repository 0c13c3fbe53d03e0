use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::auth::AuthenticatedUser;
use crate::models::Role;
use crate::AppState;

// Cache roles per profile id (30-second TTL). Role writes invalidate
// their entry so a changed role is visible on the next request.
static ROLE_CACHE: Lazy<Cache<i32, Role>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(30))
        .max_capacity(10_000)
        .build()
});

/// Fetch a profile's role with caching.
pub async fn get_cached_role(db: &sqlx::PgPool, profile_id: i32) -> Result<Role, sqlx::Error> {
    if let Some(cached) = ROLE_CACHE.get(&profile_id).await {
        return Ok(cached);
    }

    let role_text = sqlx::query_scalar::<_, String>(
        r#"SELECT role FROM "UserProfiles" WHERE id = $1"#,
    )
    .bind(profile_id)
    .fetch_one(db)
    .await?;

    let role = Role::try_from(role_text).map_err(|e| sqlx::Error::Decode(e.into()))?;

    ROLE_CACHE.insert(profile_id, role).await;
    Ok(role)
}

/// Drop the cached role for a profile. Called after a role write so the
/// next gated check sees the new role without waiting out the TTL.
pub async fn invalidate_role(profile_id: i32) {
    ROLE_CACHE.invalidate(&profile_id).await;
}

/// An authenticated user whose current role is admin. Non-admins get 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();

        async move {
            let user = AuthenticatedUser::from_request_parts(parts, &state).await?;

            // Re-check through the cache rather than trusting the role
            // captured at token validation time
            let role = get_cached_role(&state.db, user.profile_id)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, profile_id = user.profile_id, "Role lookup failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(json!({ "error": "Database error" })),
                    )
                })?;

            if !role.is_admin() {
                return Err((
                    StatusCode::FORBIDDEN,
                    axum::Json(json!({ "error": "Admin role required" })),
                ));
            }

            Ok(AdminUser(user))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    // ROLE_CACHE is process-global, so this is the only test allowed to
    // touch it
    #[sqlx::test]
    async fn role_write_is_visible_after_invalidation(pool: PgPool) {
        let profile_id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "UserProfiles" (auth_id, email) VALUES ('user_role_cache', 'rc@example.com') RETURNING id"#,
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(get_cached_role(&pool, profile_id).await.unwrap(), Role::User);

        sqlx::query(r#"UPDATE "UserProfiles" SET role = 'admin' WHERE id = $1"#)
            .bind(profile_id)
            .execute(&pool)
            .await
            .unwrap();

        // Still within the TTL, the stale role is served from cache
        assert_eq!(get_cached_role(&pool, profile_id).await.unwrap(), Role::User);

        // After invalidation the next check sees the new role immediately
        invalidate_role(profile_id).await;
        assert_eq!(get_cached_role(&pool, profile_id).await.unwrap(), Role::Admin);
    }
}
