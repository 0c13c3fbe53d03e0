use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::journal::JournalSettings;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJournalInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub settings: Option<JournalSettings>,
}

/// Full-document overwrite shape for PUT. Every mutable field is required;
/// the stored journal becomes exactly this.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateJournalInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub is_archived: bool,
    pub settings: JournalSettings,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JournalMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}
