use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::core::filters::{genders_compatible, rank_candidates};
use crate::core::scoring::compatibility_score;
use crate::core::store::{MatchingStore, NotificationSink, SearchFilters, StoreError};
use crate::models::{
    MatchRequest, MatchStatus, MatchView, MatchesResponse, RoommateProfile, ScoredCandidate,
    ScoringWeights, SearchQuery, UpsertProfileRequest,
};

/// Search pages are capped regardless of what the client asks for
pub const MAX_SEARCH_LIMIT: u16 = 50;

/// Everything that can go wrong in a match lifecycle operation
///
/// Every variant is surfaced synchronously to the caller with its message;
/// nothing is retried or silently corrected.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("You cannot send a match request to yourself")]
    SelfMatch,

    #[error("Create a roommate profile before sending match requests")]
    ProfileRequired,

    #[error("This user has no active roommate profile")]
    TargetProfileRequired,

    #[error("User not found")]
    UserNotFound,

    #[error("This user is not eligible for roommate matching")]
    NotEligible,

    #[error("Roommate matching is only available between users of the same gender")]
    GenderMismatch,

    #[error("A match request between you and this user already exists")]
    DuplicatePair,

    #[error("Match request not found")]
    MatchNotFound,

    #[error("Only the recipient of a match request can respond to it")]
    NotYourMatch,

    #[error("You are not part of this match request")]
    NotParticipant,

    #[error("This match request has already been responded to")]
    AlreadyResponded,

    #[error("Status must be either accepted or rejected")]
    InvalidDecision,

    #[error("Roommate profile not found")]
    ProfileNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MatchError {
    /// Stable machine-readable tag for the error payload
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::SelfMatch => "self_match",
            MatchError::ProfileRequired => "profile_required",
            MatchError::TargetProfileRequired => "target_profile_required",
            MatchError::UserNotFound => "user_not_found",
            MatchError::NotEligible => "not_eligible",
            MatchError::GenderMismatch => "gender_mismatch",
            MatchError::DuplicatePair => "duplicate_pair",
            MatchError::MatchNotFound => "match_not_found",
            MatchError::NotYourMatch => "not_your_match",
            MatchError::NotParticipant => "not_participant",
            MatchError::AlreadyResponded => "already_responded",
            MatchError::InvalidDecision => "invalid_decision",
            MatchError::ProfileNotFound => "profile_not_found",
            MatchError::Store(_) => "storage_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            MatchError::SelfMatch
            | MatchError::ProfileRequired
            | MatchError::TargetProfileRequired
            | MatchError::NotEligible
            | MatchError::GenderMismatch
            | MatchError::InvalidDecision => 400,
            MatchError::NotYourMatch | MatchError::NotParticipant => 403,
            MatchError::UserNotFound | MatchError::MatchNotFound | MatchError::ProfileNotFound => {
                404
            }
            MatchError::DuplicatePair | MatchError::AlreadyResponded => 409,
            MatchError::Store(_) => 500,
        }
    }
}

/// Match lifecycle manager
///
/// Owns the pending -> accepted/rejected state machine and the candidate
/// search, with storage and notification delivery injected so tests can
/// substitute in-memory fakes.
pub struct MatchLifecycle<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    weights: ScoringWeights,
}

impl<S, N> MatchLifecycle<S, N>
where
    S: MatchingStore,
    N: NotificationSink,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, weights: ScoringWeights) -> Self {
        Self {
            store,
            notifier,
            weights,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Fetch a user's profile, withdrawn or not
    pub async fn get_profile(&self, user_id: Uuid) -> Result<RoommateProfile, MatchError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or(MatchError::ProfileNotFound)
    }

    /// Create-or-replace the caller's preference profile
    pub async fn upsert_profile(
        &self,
        req: &UpsertProfileRequest,
    ) -> Result<RoommateProfile, MatchError> {
        if self.store.get_user(req.user_id).await?.is_none() {
            return Err(MatchError::UserNotFound);
        }

        let profile = self.store.upsert_profile(req).await?;
        tracing::info!(user_id = %req.user_id, "Roommate profile upserted");
        Ok(profile)
    }

    /// Soft-withdraw the caller's profile from matching
    pub async fn withdraw_profile(&self, user_id: Uuid) -> Result<(), MatchError> {
        if !self.store.deactivate_profile(user_id).await? {
            return Err(MatchError::ProfileNotFound);
        }
        tracing::info!(user_id = %user_id, "Roommate profile withdrawn from matching");
        Ok(())
    }

    /// Create a pending match request from requester to target
    ///
    /// All gates must pass before anything is written: active requester
    /// profile, existing eligible target with an active profile, gender
    /// compatibility, and no record for the unordered pair.
    pub async fn create_request(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        message: Option<String>,
    ) -> Result<MatchRequest, MatchError> {
        if requester_id == target_id {
            return Err(MatchError::SelfMatch);
        }

        let requester = self
            .store
            .get_user(requester_id)
            .await?
            .ok_or(MatchError::UserNotFound)?;

        let my_profile = self
            .active_profile(requester_id)
            .await?
            .ok_or(MatchError::ProfileRequired)?;

        let target = self
            .store
            .get_user(target_id)
            .await?
            .ok_or(MatchError::UserNotFound)?;
        if !target.can_match() {
            return Err(MatchError::NotEligible);
        }

        let target_profile = self
            .active_profile(target_id)
            .await?
            .ok_or(MatchError::TargetProfileRequired)?;

        if !genders_compatible(requester.gender.as_deref(), target.gender.as_deref()) {
            return Err(MatchError::GenderMismatch);
        }

        // Fast path; the canonical-pair unique index catches the race
        if self.store.find_pair(requester_id, target_id).await?.is_some() {
            return Err(MatchError::DuplicatePair);
        }

        let score = compatibility_score(&my_profile, &target_profile, &self.weights);

        let record = self
            .store
            .insert_match(requester_id, target_id, score as i16, message)
            .await
            .map_err(|e| match e {
                StoreError::DuplicatePair => MatchError::DuplicatePair,
                other => MatchError::Store(other),
            })?;

        tracing::info!(
            match_id = %record.id,
            requester_id = %requester_id,
            target_id = %target_id,
            score,
            "Match request created"
        );

        self.notify_quietly(
            target_id,
            "New roommate match request",
            &format!("{} sent you a roommate match request", requester.display_name),
            record.id,
        )
        .await;

        Ok(record)
    }

    /// Respond to a pending match request
    ///
    /// Only the stored target may respond, exactly once.
    pub async fn respond(
        &self,
        responder_id: Uuid,
        match_id: Uuid,
        decision: MatchStatus,
    ) -> Result<MatchRequest, MatchError> {
        if decision == MatchStatus::Pending {
            return Err(MatchError::InvalidDecision);
        }

        let record = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(MatchError::MatchNotFound)?;

        if record.target_id != responder_id {
            return Err(MatchError::NotYourMatch);
        }
        if record.status != MatchStatus::Pending {
            return Err(MatchError::AlreadyResponded);
        }

        let updated = self.store.set_match_status(match_id, decision).await?;

        tracing::info!(
            match_id = %match_id,
            responder_id = %responder_id,
            status = ?decision,
            "Match request responded"
        );

        let responder_name = self
            .store
            .get_user(responder_id)
            .await?
            .map(|u| u.display_name)
            .unwrap_or_else(|| "Your match".to_string());

        let (title, body) = match decision {
            MatchStatus::Accepted => (
                "Match request accepted",
                format!("{} accepted your roommate match request", responder_name),
            ),
            _ => (
                "Match request declined",
                format!("{} declined your roommate match request", responder_name),
            ),
        };
        self.notify_quietly(updated.requester_id, title, &body, updated.id)
            .await;

        Ok(updated)
    }

    /// Withdraw or remove a match request; either party, any status
    pub async fn withdraw_request(&self, actor_id: Uuid, match_id: Uuid) -> Result<(), MatchError> {
        let record = self
            .store
            .get_match(match_id)
            .await?
            .ok_or(MatchError::MatchNotFound)?;

        if record.requester_id != actor_id && record.target_id != actor_id {
            return Err(MatchError::NotParticipant);
        }

        self.store.delete_match(match_id).await?;
        tracing::info!(match_id = %match_id, actor_id = %actor_id, "Match request removed");
        Ok(())
    }

    /// The caller's sent and received records, enriched with counterpart
    /// summaries and profile snapshots
    pub async fn list_matches(&self, user_id: Uuid) -> Result<MatchesResponse, MatchError> {
        let records = self.store.list_matches(user_id).await?;

        let mut sent = Vec::new();
        let mut received = Vec::new();

        for record in records {
            let outgoing = record.requester_id == user_id;
            let counterpart_id = if outgoing {
                record.target_id
            } else {
                record.requester_id
            };

            // Counterpart account may have been deleted upstream; skip the
            // orphaned record rather than failing the listing
            let Some(counterpart) = self.store.get_user(counterpart_id).await? else {
                tracing::warn!(match_id = %record.id, counterpart_id = %counterpart_id,
                    "Skipping match with missing counterpart user");
                continue;
            };
            let counterpart_profile = self.store.get_profile(counterpart_id).await?;

            let view = MatchView {
                record,
                counterpart,
                counterpart_profile,
            };
            if outgoing {
                sent.push(view);
            } else {
                received.push(view);
            }
        }

        Ok(MatchesResponse { sent, received })
    }

    /// Filterable, ranked candidate search
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredCandidate>, MatchError> {
        let requester = self
            .store
            .get_user(query.user_id)
            .await?
            .ok_or(MatchError::UserNotFound)?;

        let my_profile = self.active_profile(query.user_id).await?;

        let filters = SearchFilters {
            exclude_user: query.user_id,
            university: query.university.clone(),
            budget_min: query.budget_min,
            budget_max: query.budget_max,
            sleep_schedule: query.sleep_schedule,
            study_habits: query.study_habits,
            smoking_allowed: query.smoking_allowed,
            pets_allowed: query.pets_allowed,
            major: query.major.clone(),
            gender: requester.gender.clone(),
            limit: query.limit.min(MAX_SEARCH_LIMIT) as i64,
            offset: query.offset as i64,
        };

        let candidates = self.store.search_candidates(&filters).await?;
        tracing::debug!(
            user_id = %query.user_id,
            count = candidates.len(),
            scored = my_profile.is_some(),
            "Candidate search"
        );

        Ok(rank_candidates(my_profile.as_ref(), candidates, &self.weights))
    }

    async fn active_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<RoommateProfile>, MatchError> {
        Ok(self
            .store
            .get_profile(user_id)
            .await?
            .filter(|p| p.is_active))
    }

    /// Delivery failure must never fail the transition it accompanies
    async fn notify_quietly(&self, user_id: Uuid, title: &str, message: &str, match_id: Uuid) {
        if let Err(e) = self.notifier.notify(user_id, title, message, match_id).await {
            tracing::warn!(user_id = %user_id, match_id = %match_id,
                "Failed to deliver match notification: {}", e);
        }
    }
}
