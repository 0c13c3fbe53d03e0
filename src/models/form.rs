use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::template::FieldType;

/// One renderable input control. Exactly one of these is produced per
/// field descriptor with a recognized type.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormControl {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME accept filter, present only for image controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

/// One form section per journal type.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSection {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub controls: Vec<FormControl>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenderedForm {
    #[serde(rename = "templateId")]
    pub template_id: Uuid,
    pub name: String,
    pub sections: Vec<FormSection>,
}

/// An image value inside a submission: raw file bytes, base64-encoded.
/// Uploaded to file storage before the payload is assembled.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageUpload {
    pub filename: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    /// Base64-encoded file contents.
    pub data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitFormInput {
    /// Which journal type of the template was filled in.
    #[serde(rename = "journalType")]
    pub journal_type: String,
    /// Target journal; when absent the default journal is used.
    #[serde(rename = "journalId")]
    pub journal_id: Option<Uuid>,
    /// Optional free-text body for the created entry.
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw field values keyed by field id.
    #[schema(value_type = Object)]
    pub values: Map<String, Value>,
}
