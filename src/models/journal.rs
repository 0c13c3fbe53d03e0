use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-journal settings stored as a JSONB document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalSettings {
    pub is_private: bool,
    pub allow_comments: bool,
    pub allow_sharing: bool,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            is_private: true,
            allow_comments: false,
            allow_sharing: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Journal {
    pub id: Uuid,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub is_archived: bool,
    #[sqlx(json)]
    pub settings: JournalSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
