use serde::{Deserialize, Serialize};

use crate::models::domain::{MatchRequest, RoommateProfile, ScoredCandidate, UserSummary};

/// Response for the candidate search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub candidates: Vec<ScoredCandidate>,
    pub limit: u16,
    pub offset: u32,
}

/// A match record enriched with the counterpart's public summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub record: MatchRequest,
    pub counterpart: UserSummary,
    pub counterpart_profile: Option<RoommateProfile>,
}

/// Response for GET /roommates/matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    pub sent: Vec<MatchView>,
    pub received: Vec<MatchView>,
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
