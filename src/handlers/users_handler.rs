use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::{roles, AdminUser},
    models::{
        AdminStats, PartitionedUsers, UpdateRoleInput, UpdateUserProfileInput, UserMutationResponse,
        UserProfile,
    },
    AppError, AppResult, AppState,
};

/// GET /api/admin/users - role-partitioned user lists
///
/// The three partitions are independent loads; fetch them concurrently
/// and join before responding.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users partitioned by role", body = PartitionedUsers),
        (status = 403, description = "Admin role required")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<PartitionedUsers>> {
    let db = &state.db;

    let (admins, creators, users) = tokio::try_join!(
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT * FROM "UserProfiles" WHERE role = 'admin' ORDER BY email"#
        )
        .fetch_all(db),
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT * FROM "UserProfiles" WHERE role = 'creator' ORDER BY email"#
        )
        .fetch_all(db),
        sqlx::query_as::<_, UserProfile>(
            r#"SELECT * FROM "UserProfiles" WHERE role = 'user' ORDER BY email"#
        )
        .fetch_all(db),
    )?;

    Ok(Json(PartitionedUsers {
        admins,
        creators,
        users,
    }))
}

/// GET /api/admin/users/{id}
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i32, Path, description = "User profile ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    _admin: AdminUser,
) -> AppResult<Json<UserProfile>> {
    let user = sqlx::query_as::<_, UserProfile>(
        r#"SELECT * FROM "UserProfiles" WHERE id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(user))
}

/// GET /api/admin/stats - dashboard counters
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = AdminStats),
        (status = 403, description = "Admin role required")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<AdminStats>> {
    // Run all COUNT queries in parallel
    let db = &state.db;

    let (total_users, active_users, new_users, total_journals, total_entries, total_templates) =
        tokio::try_join!(
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "UserProfiles""#).fetch_one(db),
            sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM "UserProfiles" WHERE is_active = true"#
            )
            .fetch_one(db),
            sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM "UserProfiles" WHERE created_at >= now() - interval '30 days'"#
            )
            .fetch_one(db),
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "Journals""#).fetch_one(db),
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "Entries""#).fetch_one(db),
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "Templates""#).fetch_one(db),
        )?;

    Ok(Json(AdminStats {
        total_users,
        active_users,
        new_users_last_30_days: new_users,
        total_journals,
        total_entries,
        total_templates,
    }))
}

/// PUT /api/admin/users/{id}/role
///
/// Writes the role and drops the target's cached role, so the change is
/// live on their very next request.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(
        ("id" = i32, Path, description = "User profile ID")
    ),
    request_body = UpdateRoleInput,
    responses(
        (status = 200, description = "Role updated", body = UserProfile),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Cannot demote the only admin")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    admin: AdminUser,
    Json(input): Json<UpdateRoleInput>,
) -> AppResult<Json<UserProfile>> {
    // Demoting the last admin would lock the admin surface for everyone
    if !input.role.is_admin() {
        let admin_count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM "UserProfiles" WHERE role = 'admin' AND id <> $1"#,
        )
        .bind(user_id)
        .fetch_one(&state.db)
        .await?;

        if admin_count == 0 {
            return Err(AppError::Conflict(
                "Cannot demote the only remaining admin".to_string(),
            ));
        }
    }

    let user = sqlx::query_as::<_, UserProfile>(
        r#"UPDATE "UserProfiles" SET role = $1 WHERE id = $2 RETURNING *"#,
    )
    .bind(input.role.as_str())
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    roles::invalidate_role(user_id).await;

    tracing::info!(
        target = user_id,
        role = user.role.as_str(),
        by = admin.0.profile_id,
        "Role updated"
    );

    Ok(Json(user))
}

/// PUT /api/admin/users/{id} - activate or deactivate a profile
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i32, Path, description = "User profile ID")
    ),
    request_body = UpdateUserProfileInput,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    admin: AdminUser,
    Json(input): Json<UpdateUserProfileInput>,
) -> AppResult<Json<UserProfile>> {
    let user = sqlx::query_as::<_, UserProfile>(
        r#"UPDATE "UserProfiles" SET is_active = $1 WHERE id = $2 RETURNING *"#,
    )
    .bind(input.is_active)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!(
        target = user_id,
        is_active = user.is_active,
        by = admin.0.profile_id,
        "Profile activation changed"
    );

    Ok(Json(user))
}

/// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i32, Path, description = "User profile ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserMutationResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Admins cannot delete themselves")
    ),
    tag = "admin",
    security(("cookie_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    admin: AdminUser,
) -> AppResult<Json<UserMutationResponse>> {
    if user_id == admin.0.profile_id {
        return Err(AppError::Conflict(
            "Admins cannot delete their own profile".to_string(),
        ));
    }

    let result = sqlx::query(r#"DELETE FROM "UserProfiles" WHERE id = $1"#)
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    roles::invalidate_role(user_id).await;

    Ok(Json(UserMutationResponse {
        success: true,
        message: Some("User deleted successfully".to_string()),
    }))
}
