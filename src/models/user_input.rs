use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{Role, UserProfile};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleInput {
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserProfileInput {
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserMutationResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// The three role-partitioned user lists the admin dashboard shows.
#[derive(Debug, Serialize, ToSchema)]
pub struct PartitionedUsers {
    pub admins: Vec<UserProfile>,
    pub creators: Vec<UserProfile>,
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub new_users_last_30_days: i64,
    pub total_journals: i64,
    pub total_entries: i64,
    pub total_templates: i64,
}
