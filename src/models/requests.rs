use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{BrowseFilters, SortKey};

/// Request to browse candidate profiles
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BrowseRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    pub filters: BrowseFilters,
    #[serde(default)]
    pub sort: SortKey,
}

fn default_limit() -> u16 {
    20
}

/// Request body shared by the like, unlike and block transitions
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "from_user_id", rename = "fromUserId")]
    pub from_user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "to_user_id", rename = "toUserId")]
    pub to_user_id: String,
}

/// Query parameters for the connection status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectionStatusQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "viewer_id", rename = "viewerId")]
    pub viewer_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: String,
}
