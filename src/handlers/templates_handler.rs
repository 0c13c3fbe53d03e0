use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use super::entries_handler::{insert_entry, resolve_journal};
use crate::{
    extractors::{roles, AuthenticatedUser},
    forms,
    models::{
        validate_journal_types, CreateTemplateInput, Entry, RenderedForm, SubmitFormInput,
        Template, TemplateMutationResponse, UpdateTemplateInput,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetTemplatesQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Case-insensitive match against template names
    pub search: Option<String>,
}

/// GET /api/templates?category=&tag=&search=
#[utoipa::path(
    get,
    path = "/api/templates",
    params(GetTemplatesQuery),
    responses(
        (status = 200, description = "Marketplace templates", body = Vec<Template>)
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn get_templates(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedUser,
    Query(query): Query<GetTemplatesQuery>,
) -> AppResult<Json<Vec<Template>>> {
    let mut sql = String::from(r#"SELECT * FROM "Templates" WHERE 1=1"#);
    let mut bind_count = 0;

    if query.category.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND category = ${}", bind_count));
    }
    if query.tag.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND ${} = ANY(tags)", bind_count));
    }
    if query.search.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND name ILIKE ${}", bind_count));
    }

    sql.push_str(" ORDER BY name");

    let mut db_query = sqlx::query_as::<_, Template>(&sql);

    if let Some(category) = &query.category {
        db_query = db_query.bind(category);
    }
    if let Some(tag) = &query.tag {
        db_query = db_query.bind(tag);
    }
    if let Some(search) = &query.search {
        db_query = db_query.bind(format!("%{}%", search));
    }

    let templates = db_query.fetch_all(&state.db).await?;

    Ok(Json(templates))
}

/// GET /api/templates/{id}
#[utoipa::path(
    get,
    path = "/api/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template found", body = Template),
        (status = 404, description = "Template not found")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    _auth: AuthenticatedUser,
) -> AppResult<Json<Template>> {
    let template = fetch_template(&state.db, template_id).await?;
    Ok(Json(template))
}

/// GET /api/templates/{id}/form - the renderable form for a template
#[utoipa::path(
    get,
    path = "/api/templates/{id}/form",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Rendered form controls", body = RenderedForm),
        (status = 404, description = "Template not found")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn get_template_form(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    _auth: AuthenticatedUser,
) -> AppResult<Json<RenderedForm>> {
    let template = fetch_template(&state.db, template_id).await?;
    Ok(Json(forms::render_form(&template)))
}

/// POST /api/templates/{id}/submissions - submit a filled-in form
///
/// Validates the values against the template, uploads any image fields to
/// file storage, and writes the resulting payload as a new entry in the
/// target (or default) journal.
#[utoipa::path(
    post,
    path = "/api/templates/{id}/submissions",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    request_body = SubmitFormInput,
    responses(
        (status = 200, description = "Entry created from submission", body = Entry),
        (status = 400, description = "Unknown journal type"),
        (status = 404, description = "Template or journal not found"),
        (status = 422, description = "Submission failed validation")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn submit_template_form(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    auth: AuthenticatedUser,
    Json(input): Json<SubmitFormInput>,
) -> AppResult<Json<Entry>> {
    let template = fetch_template(&state.db, template_id).await?;

    let payload = forms::build_submission(
        &template,
        &input.journal_type,
        &input.values,
        auth.profile_id,
        state.storage.as_ref(),
    )
    .await
    .map_err(|e| match e {
        forms::SubmissionError::UnknownJournalType(_) => AppError::BadRequest(e.detail()),
        forms::SubmissionError::Invalid(_) => AppError::Validation(e.detail()),
    })?;

    let journal_id = resolve_journal(&state.db, auth.profile_id, input.journal_id).await?;

    let entry = insert_entry(
        &state.db,
        journal_id,
        auth.profile_id,
        input.content.as_deref().unwrap_or(""),
        &input.journal_type,
        &template.category,
        &input.tags,
        &serde_json::Value::Object(payload),
    )
    .await?;

    Ok(Json(entry))
}

/// POST /api/templates - Create a template (creator or admin)
#[utoipa::path(
    post,
    path = "/api/templates",
    request_body = CreateTemplateInput,
    responses(
        (status = 200, description = "Template created", body = Template),
        (status = 403, description = "Creator or admin role required"),
        (status = 422, description = "Template failed validation")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Json(input): Json<CreateTemplateInput>,
) -> AppResult<Json<Template>> {
    require_template_management(&state, &auth).await?;

    validate_journal_types(&input.journal_types)
        .map_err(|errors| AppError::Validation(errors.join("; ")))?;

    let template = sqlx::query_as::<_, Template>(
        r#"
        INSERT INTO "Templates" (name, description, category, tags, icon, color, features, journal_types)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.tags)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(&input.features)
    .bind(sqlx::types::Json(&input.journal_types))
    .fetch_one(&state.db)
    .await?;

    tracing::info!(template_id = %template.id, by = auth.profile_id, "Template created");

    Ok(Json(template))
}

/// PUT /api/templates/{id} - full overwrite (creator or admin)
#[utoipa::path(
    put,
    path = "/api/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    request_body = UpdateTemplateInput,
    responses(
        (status = 200, description = "Template updated", body = Template),
        (status = 403, description = "Creator or admin role required"),
        (status = 404, description = "Template not found"),
        (status = 422, description = "Template failed validation")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    auth: AuthenticatedUser,
    Json(input): Json<UpdateTemplateInput>,
) -> AppResult<Json<Template>> {
    require_template_management(&state, &auth).await?;

    validate_journal_types(&input.journal_types)
        .map_err(|errors| AppError::Validation(errors.join("; ")))?;

    let template = sqlx::query_as::<_, Template>(
        r#"
        UPDATE "Templates"
        SET name = $1,
            description = $2,
            category = $3,
            tags = $4,
            icon = $5,
            color = $6,
            features = $7,
            journal_types = $8,
            updated_at = now()
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.tags)
    .bind(&input.icon)
    .bind(&input.color)
    .bind(&input.features)
    .bind(sqlx::types::Json(&input.journal_types))
    .bind(template_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Template {} not found", template_id)))?;

    Ok(Json(template))
}

/// DELETE /api/templates/{id} (creator or admin)
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template deleted", body = TemplateMutationResponse),
        (status = 403, description = "Creator or admin role required"),
        (status = 404, description = "Template not found")
    ),
    tag = "templates",
    security(("cookie_auth" = []))
)]
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<Uuid>,
    auth: AuthenticatedUser,
) -> AppResult<Json<TemplateMutationResponse>> {
    require_template_management(&state, &auth).await?;

    let result = sqlx::query(r#"DELETE FROM "Templates" WHERE id = $1"#)
        .bind(template_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Template {} not found",
            template_id
        )));
    }

    Ok(Json(TemplateMutationResponse {
        success: true,
        message: Some("Template deleted successfully".to_string()),
    }))
}

async fn fetch_template(db: &sqlx::PgPool, template_id: Uuid) -> AppResult<Template> {
    sqlx::query_as::<_, Template>(r#"SELECT * FROM "Templates" WHERE id = $1"#)
        .bind(template_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {} not found", template_id)))
}

async fn require_template_management(
    state: &AppState,
    auth: &AuthenticatedUser,
) -> AppResult<()> {
    let role = roles::get_cached_role(&state.db, auth.profile_id).await?;

    if !role.can_manage_templates() {
        return Err(AppError::Forbidden(
            "Creator or admin role required to manage templates".to_string(),
        ));
    }

    Ok(())
}
