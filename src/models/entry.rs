use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A single dated record inside a journal. `metadata` is the free-form
/// key-value map produced by a template form submission (or supplied
/// directly on manual entry creation).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub user_id: i32,
    pub content: String,
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub tags: Vec<String>,
    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
