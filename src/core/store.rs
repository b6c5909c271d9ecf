use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CandidateProfile, MatchRequest, MatchStatus, RoommateProfile, SleepSchedule, StudyHabits,
    UpsertProfileRequest, UserSummary,
};

/// Errors surfaced by a matching store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Raised when an insert loses the race against the canonical-pair
    /// unique index. The application-side duplicate check is a fast path
    /// only; this is the authoritative signal.
    #[error("A match record for this pair already exists")]
    DuplicatePair,
}

/// Notification delivery failure. Callers log and continue; delivery is
/// never allowed to fail the state transition it accompanies.
#[derive(Debug, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Structural filters applied at the storage layer before scoring
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub exclude_user: Uuid,
    pub university: Option<String>,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub sleep_schedule: Option<SleepSchedule>,
    pub study_habits: Option<StudyHabits>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub major: Option<String>,
    /// Restrict candidates to this gender (the requester's, when set)
    pub gender: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Storage seam for the match lifecycle
///
/// Implemented by the PostgreSQL client in production and by an in-memory
/// fake in tests.
#[allow(async_fn_in_trait)]
pub trait MatchingStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserSummary>, StoreError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<RoommateProfile>, StoreError>;

    /// Create-or-replace keyed on user id; reactivates a withdrawn profile
    async fn upsert_profile(
        &self,
        req: &UpsertProfileRequest,
    ) -> Result<RoommateProfile, StoreError>;

    /// Soft withdrawal: sets is_active = false. Returns false when the user
    /// has no profile.
    async fn deactivate_profile(&self, user_id: Uuid) -> Result<bool, StoreError>;

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRequest>, StoreError>;

    /// Any record for the unordered pair, either direction
    async fn find_pair(&self, a: Uuid, b: Uuid) -> Result<Option<MatchRequest>, StoreError>;

    async fn insert_match(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        score: i16,
        message: Option<String>,
    ) -> Result<MatchRequest, StoreError>;

    /// Sets status and stamps responded_at
    async fn set_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<MatchRequest, StoreError>;

    /// Hard delete. Returns false when the record does not exist.
    async fn delete_match(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All records where the user is requester or target, newest first
    async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchRequest>, StoreError>;

    /// Active profiles passing the structural filters, newest first
    async fn search_candidates(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<CandidateProfile>, StoreError>;
}

/// Side-effect seam for match event notifications
#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        match_id: Uuid,
    ) -> Result<(), NotifyError>;
}
