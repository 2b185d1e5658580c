use serde::{Deserialize, Serialize};

use crate::models::domain::ScoredCandidate;

/// Response for the browse endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseResponse {
    pub candidates: Vec<ScoredCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for a like transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub matched: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
