use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's roommate preference profile
///
/// One row per user. Optional fields are genuinely optional: the scorer
/// falls back to neutral credit when a side has not filled something in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateProfile {
    pub user_id: Uuid,
    pub university: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    /// 1 (relaxed) to 5 (spotless)
    pub cleanliness_level: Option<i16>,
    /// 1 (needs quiet) to 5 (noise is fine)
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
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_areas: Vec<String>,
    /// Per-user 1-5 category weights. Persisted verbatim; scoring does not
    /// read it yet, so it round-trips through the API untouched.
    pub matching_priorities: Option<serde_json::Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoommateProfile {
    /// Complete budget range, if both ends are set
    pub fn budget_range(&self) -> Option<(i32, i32)> {
        match (self.budget_min, self.budget_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sleep_schedule", rename_all = "lowercase")]
pub enum SleepSchedule {
    Early,
    Normal,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "study_habits", rename_all = "lowercase")]
pub enum StudyHabits {
    Home,
    Library,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "guest_frequency", rename_all = "lowercase")]
pub enum GuestFrequency {
    Never,
    #[default]
    Sometimes,
    Often,
}

/// Lifecycle state of a match request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Directed match request between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub compatibility_score: Option<i16>,
    pub status: MatchStatus,
    pub message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public slice of the upstream users table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub gender: Option<String>,
    pub role: String,
}

impl UserSummary {
    /// Only students take part in roommate matching
    pub fn can_match(&self) -> bool {
        self.role == "student"
    }
}

/// A candidate row as fetched from storage: profile joined with the
/// owner's display name
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub display_name: String,
    pub profile: RoommateProfile,
}

/// A search result: candidate profile summary plus computed score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub user_id: Uuid,
    pub display_name: String,
    pub university: Option<String>,
    pub major: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub cleanliness_level: Option<i16>,
    pub noise_level: Option<i16>,
    pub sleep_schedule: Option<SleepSchedule>,
    pub study_habits: Option<StudyHabits>,
    pub smoking_allowed: bool,
    pub pets_allowed: bool,
    pub guest_frequency: GuestFrequency,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub preferred_areas: Vec<String>,
    pub move_in_date: Option<NaiveDate>,
    /// None when the requester has no profile of their own to score against
    pub compatibility_score: Option<u8>,
    pub shared_interests: Vec<String>,
}

/// Relative weights of the nine compatibility criteria
///
/// Defaults sum to exactly 100; the scorer renormalizes by the actual total
/// so overridden weights stay on the 0-100 scale.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub budget: f64,
    pub major: f64,
    pub interests: f64,
    pub cleanliness: f64,
    pub noise: f64,
    pub sleep: f64,
    pub study: f64,
    pub smoking: f64,
    pub pets: f64,
    pub guests: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.budget
            + self.major
            + self.interests
            + self.cleanliness
            + self.noise
            + self.sleep
            + self.study
            + self.smoking
            + self.pets
            + self.guests
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            budget: 25.0,
            major: 10.0,
            interests: 10.0,
            cleanliness: 10.0,
            noise: 10.0,
            sleep: 10.0,
            study: 10.0,
            smoking: 5.0,
            pets: 5.0,
            guests: 5.0,
        }
    }
}
