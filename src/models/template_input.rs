use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::template::JournalType;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTemplateInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "journalTypes")]
    pub journal_types: Vec<JournalType>,
}

/// Full-document overwrite shape for PUT; same fields as create.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTemplateInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "journalTypes")]
    pub journal_types: Vec<JournalType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
