use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use super::journals_handler::ensure_default_journal;
use crate::{
    extractors::AuthenticatedUser,
    models::{CreateEntryInput, Entry, EntryMutationResponse, UpdateEntryInput},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetEntriesQuery {
    #[serde(rename = "journalId")]
    pub journal_id: Option<Uuid>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub tag: Option<String>,
}

/// GET /api/entries?journalId=&category=&type=&tag=
#[utoipa::path(
    get,
    path = "/api/entries",
    params(GetEntriesQuery),
    responses(
        (status = 200, description = "The caller's entries, newest first", body = Vec<Entry>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn get_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Query(query): Query<GetEntriesQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    // Build the filter dynamically; every clause is bound, never inlined
    let mut sql = String::from(r#"SELECT * FROM "Entries" WHERE user_id = $1"#);
    let mut bind_count = 1;

    if query.journal_id.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND journal_id = ${}", bind_count));
    }
    if query.category.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND category = ${}", bind_count));
    }
    if query.entry_type.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND entry_type = ${}", bind_count));
    }
    if query.tag.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND ${} = ANY(tags)", bind_count));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let mut db_query = sqlx::query_as::<_, Entry>(&sql).bind(auth.profile_id);

    if let Some(journal_id) = query.journal_id {
        db_query = db_query.bind(journal_id);
    }
    if let Some(category) = &query.category {
        db_query = db_query.bind(category);
    }
    if let Some(entry_type) = &query.entry_type {
        db_query = db_query.bind(entry_type);
    }
    if let Some(tag) = &query.tag {
        db_query = db_query.bind(tag);
    }

    let entries = db_query.fetch_all(&state.db).await?;

    Ok(Json(entries))
}

/// GET /api/entries/{id}
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry found", body = Entry),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<Entry>> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"SELECT * FROM "Entries" WHERE id = $1 AND user_id = $2"#,
    )
    .bind(entry_id)
    .bind(auth.profile_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    Ok(Json(entry))
}

/// POST /api/entries
///
/// When no journalId is supplied the entry lands in the user's default
/// journal, which is provisioned on first use.
#[utoipa::path(
    post,
    path = "/api/entries",
    request_body = CreateEntryInput,
    responses(
        (status = 200, description = "Entry created", body = Entry),
        (status = 404, description = "Named journal not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateEntryInput>,
) -> AppResult<Json<Entry>> {
    if input.category.trim().is_empty() {
        return Err(AppError::Validation("Entry category must not be empty".to_string()));
    }

    let journal_id = resolve_journal(&state.db, auth.profile_id, input.journal_id).await?;

    let metadata = input.metadata.unwrap_or_else(|| json!({}));

    let entry = insert_entry(
        &state.db,
        journal_id,
        auth.profile_id,
        &input.content,
        &input.category,
        &input.entry_type,
        &input.tags,
        &metadata,
    )
    .await?;

    Ok(Json(entry))
}

/// PUT /api/entries/{id} - full overwrite of the entry document
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = UpdateEntryInput,
    responses(
        (status = 200, description = "Entry updated", body = Entry),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateEntryInput>,
) -> AppResult<Json<Entry>> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE "Entries"
        SET content = $1,
            category = $2,
            entry_type = $3,
            tags = $4,
            metadata = $5,
            updated_at = now()
        WHERE id = $6 AND user_id = $7
        RETURNING *
        "#,
    )
    .bind(&input.content)
    .bind(&input.category)
    .bind(&input.entry_type)
    .bind(&input.tags)
    .bind(sqlx::types::Json(&input.metadata))
    .bind(entry_id)
    .bind(auth.profile_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

    Ok(Json(entry))
}

/// DELETE /api/entries/{id}
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = EntryMutationResponse),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries",
    security(("cookie_auth" = []))
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<EntryMutationResponse>> {
    let result = sqlx::query(r#"DELETE FROM "Entries" WHERE id = $1 AND user_id = $2"#)
        .bind(entry_id)
        .bind(auth.profile_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Entry {} not found", entry_id)));
    }

    Ok(Json(EntryMutationResponse {
        success: true,
        message: Some("Entry deleted successfully".to_string()),
    }))
}

/// Resolve the journal an entry write targets: a named journal must exist
/// and belong to the caller; no journal means the default journal.
pub async fn resolve_journal(
    db: &sqlx::PgPool,
    user_id: i32,
    journal_id: Option<Uuid>,
) -> AppResult<Uuid> {
    match journal_id {
        Some(id) => {
            let owned = sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM "Journals" WHERE id = $1 AND user_id = $2"#,
            )
            .bind(id)
            .bind(user_id)
            .fetch_one(db)
            .await?;

            if owned == 0 {
                return Err(AppError::NotFound(format!("Journal {} not found", id)));
            }
            Ok(id)
        }
        None => Ok(ensure_default_journal(db, user_id).await?.id),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_entry(
    db: &sqlx::PgPool,
    journal_id: Uuid,
    user_id: i32,
    content: &str,
    category: &str,
    entry_type: &str,
    tags: &[String],
    metadata: &Value,
) -> Result<Entry, sqlx::Error> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO "Entries" (journal_id, user_id, content, category, entry_type, tags, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(journal_id)
    .bind(user_id)
    .bind(content)
    .bind(category)
    .bind(entry_type)
    .bind(tags)
    .bind(sqlx::types::Json(metadata))
    .fetch_one(db)
    .await?;

    tracing::info!(entry_id = %entry.id, journal_id = %journal_id, user_id, "Entry created");

    Ok(entry)
}
