use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEntryInput {
    /// When absent, the user's default journal is used (and provisioned
    /// first if they have none).
    #[serde(rename = "journalId")]
    pub journal_id: Option<Uuid>,
    pub content: String,
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

/// Full-document overwrite shape for PUT.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEntryInput {
    pub content: String,
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub tags: Vec<String>,
    #[schema(value_type = Object)]
    pub metadata: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntryMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
