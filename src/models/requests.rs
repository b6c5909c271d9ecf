use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{GuestFrequency, SleepSchedule, StudyHabits};

/// Create-or-replace a roommate preference profile
///
/// Budget ordering (min <= max) is checked in the handler; everything else
/// is declarative.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    pub user_id: Uuid,
    pub university: Option<String>,
    #[validate(range(min = 0))]
    pub budget_min: Option<i32>,
    #[validate(range(min = 0))]
    pub budget_max: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub cleanliness_level: Option<i16>,
    #[validate(range(min = 1, max = 5))]
    pub noise_level: Option<i16>,
    pub sleep_schedule: Option<SleepSchedule>,
    pub study_habits: Option<StudyHabits>,
    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default)]
    pub pets_allowed: bool,
    #[serde(default)]
    pub guest_frequency: GuestFrequency,
    pub bio: Option<String>,
    pub major: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub move_in_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub preferred_areas: Vec<String>,
    pub matching_priorities: Option<serde_json::Value>,
}

impl UpsertProfileRequest {
    /// True when both budget ends are present and inverted
    pub fn budget_inverted(&self) -> bool {
        matches!((self.budget_min, self.budget_max), (Some(min), Some(max)) if min > max)
    }
}

/// Query parameters for candidate search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub user_id: Uuid,
    pub university: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub sleep_schedule: Option<SleepSchedule>,
    pub study_habits: Option<StudyHabits>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub major: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u16 {
    20
}

/// Identifies the caller on GET/DELETE endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Body of POST /roommates/matches/{userId}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub user_id: Uuid,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

/// Body of PUT /roommates/matches/{matchId}
///
/// `status` is parsed in the handler; only "accepted" and "rejected" are
/// legal decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondMatchRequest {
    pub user_id: Uuid,
    pub status: String,
}
