// Integration tests for the match lifecycle, run against in-memory fakes
// substituted at the storage and notification seams.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use nest_match::core::lifecycle::{MatchError, MatchLifecycle};
use nest_match::core::store::{
    MatchingStore, NotificationSink, NotifyError, SearchFilters, StoreError,
};
use nest_match::models::requests::{SearchQuery, UpsertProfileRequest};
use nest_match::models::{
    CandidateProfile, GuestFrequency, MatchRequest, MatchStatus, RoommateProfile, ScoringWeights,
    SleepSchedule, UserSummary,
};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStore {
    users: Mutex<HashMap<Uuid, UserSummary>>,
    profiles: Mutex<HashMap<Uuid, RoommateProfile>>,
    matches: Mutex<Vec<MatchRequest>>,
}

impl MemoryStore {
    fn add_user(&self, id: Uuid, name: &str, gender: Option<&str>, role: &str) {
        self.users.lock().unwrap().insert(
            id,
            UserSummary {
                id,
                display_name: name.to_string(),
                gender: gender.map(String::from),
                role: role.to_string(),
            },
        );
    }

    fn add_profile(&self, profile: RoommateProfile) {
        self.profiles.lock().unwrap().insert(profile.user_id, profile);
    }
}

impl MatchingStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserSummary>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<RoommateProfile>, StoreError> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        req: &UpsertProfileRequest,
    ) -> Result<RoommateProfile, StoreError> {
        let profile = RoommateProfile {
            user_id: req.user_id,
            university: req.university.clone(),
            budget_min: req.budget_min,
            budget_max: req.budget_max,
            cleanliness_level: req.cleanliness_level,
            noise_level: req.noise_level,
            sleep_schedule: req.sleep_schedule,
            study_habits: req.study_habits,
            smoking_allowed: req.smoking_allowed,
            pets_allowed: req.pets_allowed,
            guest_frequency: req.guest_frequency,
            bio: req.bio.clone(),
            major: req.major.clone(),
            interests: req.interests.clone(),
            move_in_date: req.move_in_date,
            preferred_areas: req.preferred_areas.clone(),
            matching_priorities: req.matching_priorities.clone(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.add_profile(profile.clone());
        Ok(profile)
    }

    async fn deactivate_profile(&self, user_id: Uuid) -> Result<bool, StoreError> {
        match self.profiles.lock().unwrap().get_mut(&user_id) {
            Some(profile) => {
                profile.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRequest>, StoreError> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn find_pair(&self, a: Uuid, b: Uuid) -> Result<Option<MatchRequest>, StoreError> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| {
                (m.requester_id == a && m.target_id == b)
                    || (m.requester_id == b && m.target_id == a)
            })
            .cloned())
    }

    async fn insert_match(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        score: i16,
        message: Option<String>,
    ) -> Result<MatchRequest, StoreError> {
        let mut matches = self.matches.lock().unwrap();

        // Behaves like the canonical-pair unique index
        let exists = matches.iter().any(|m| {
            (m.requester_id == requester_id && m.target_id == target_id)
                || (m.requester_id == target_id && m.target_id == requester_id)
        });
        if exists {
            return Err(StoreError::DuplicatePair);
        }

        let record = MatchRequest {
            id: Uuid::new_v4(),
            requester_id,
            target_id,
            compatibility_score: Some(score),
            status: MatchStatus::Pending,
            message,
            responded_at: None,
            created_at: Utc::now(),
        };
        matches.push(record.clone());
        Ok(record)
    }

    async fn set_match_status(
        &self,
        id: Uuid,
        status: MatchStatus,
    ) -> Result<MatchRequest, StoreError> {
        let mut matches = self.matches.lock().unwrap();
        let record = matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        record.status = status;
        record.responded_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn delete_match(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut matches = self.matches.lock().unwrap();
        let before = matches.len();
        matches.retain(|m| m.id != id);
        Ok(matches.len() < before)
    }

    async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchRequest>, StoreError> {
        let mut records: Vec<MatchRequest> = self
            .matches
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.requester_id == user_id || m.target_id == user_id)
            .cloned()
            .collect();
        records.reverse(); // newest first
        Ok(records)
    }

    async fn search_candidates(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let users = self.users.lock().unwrap();
        let mut candidates: Vec<CandidateProfile> = self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.is_active && p.user_id != filters.exclude_user)
            .filter(|p| match (&filters.university, &p.university) {
                (Some(want), Some(have)) => want == have,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|p| {
                nest_match::core::budget_ranges_overlap(filters.budget_min, filters.budget_max, p)
            })
            .filter(|p| filters.sleep_schedule.is_none() || p.sleep_schedule == filters.sleep_schedule)
            .filter(|p| match filters.gender.as_deref() {
                Some(gender) => users
                    .get(&p.user_id)
                    .and_then(|u| u.gender.as_deref())
                    .is_some_and(|g| g == gender),
                None => true,
            })
            .map(|p| CandidateProfile {
                display_name: users
                    .get(&p.user_id)
                    .map(|u| u.display_name.clone())
                    .unwrap_or_default(),
                profile: p.clone(),
            })
            .collect();
        candidates.sort_by(|a, b| b.profile.created_at.cmp(&a.profile.created_at));
        candidates.truncate(filters.limit as usize);
        Ok(candidates)
    }
}

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(Uuid, String)>>,
}

impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        _message: &str,
        _match_id: Uuid,
    ) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .unwrap()
            .push((user_id, title.to_string()));
        Ok(())
    }
}

/// A sink that always fails, to prove transitions survive delivery failure
struct FailingSink;

impl NotificationSink for FailingSink {
    async fn notify(
        &self,
        _user_id: Uuid,
        _title: &str,
        _message: &str,
        _match_id: Uuid,
    ) -> Result<(), NotifyError> {
        Err(NotifyError("gateway unreachable".to_string()))
    }
}

fn profile_for(user_id: Uuid) -> RoommateProfile {
    RoommateProfile {
        user_id,
        university: Some("State University".to_string()),
        budget_min: Some(500),
        budget_max: Some(800),
        cleanliness_level: Some(4),
        noise_level: Some(3),
        sleep_schedule: Some(SleepSchedule::Normal),
        study_habits: None,
        smoking_allowed: false,
        pets_allowed: false,
        guest_frequency: GuestFrequency::Sometimes,
        bio: None,
        major: Some("Computer Science".to_string()),
        interests: vec!["gaming".to_string()],
        move_in_date: None,
        preferred_areas: vec![],
        matching_priorities: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct Fixture {
    store: Arc<MemoryStore>,
    sink: Arc<RecordingSink>,
    lifecycle: MatchLifecycle<MemoryStore, RecordingSink>,
    alice: Uuid,
    bob: Uuid,
}

/// Two students, same gender, both with active profiles
fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(RecordingSink::default());

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.add_user(alice, "Alice", Some("female"), "student");
    store.add_user(bob, "Beth", Some("female"), "student");
    store.add_profile(profile_for(alice));
    store.add_profile(profile_for(bob));

    let lifecycle = MatchLifecycle::new(
        store.clone(),
        sink.clone(),
        ScoringWeights::default(),
    );

    Fixture {
        store,
        sink,
        lifecycle,
        alice,
        bob,
    }
}

#[tokio::test]
async fn test_create_request_scores_and_notifies() {
    let f = fixture();

    let record = f
        .lifecycle
        .create_request(f.alice, f.bob, Some("Hey!".to_string()))
        .await
        .unwrap();

    assert_eq!(record.status, MatchStatus::Pending);
    assert_eq!(record.requester_id, f.alice);
    assert_eq!(record.target_id, f.bob);
    // Identical fixture profiles: everything matches except the unset
    // study habits, which earn neutral credit (5 of 10)
    assert_eq!(record.compatibility_score, Some(95));
    assert!(record.responded_at.is_none());

    let delivered = f.sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, f.bob);
    assert_eq!(delivered[0].1, "New roommate match request");
}

#[tokio::test]
async fn test_self_match_rejected() {
    let f = fixture();

    let result = f.lifecycle.create_request(f.alice, f.alice, None).await;
    assert!(matches!(result, Err(MatchError::SelfMatch)));
}

#[tokio::test]
async fn test_requester_without_profile_rejected() {
    let f = fixture();
    let carol = Uuid::new_v4();
    f.store.add_user(carol, "Carol", Some("female"), "student");

    let result = f.lifecycle.create_request(carol, f.bob, None).await;
    assert!(matches!(result, Err(MatchError::ProfileRequired)));
}

#[tokio::test]
async fn test_withdrawn_profile_counts_as_missing() {
    let f = fixture();
    f.lifecycle.withdraw_profile(f.alice).await.unwrap();

    let result = f.lifecycle.create_request(f.alice, f.bob, None).await;
    assert!(matches!(result, Err(MatchError::ProfileRequired)));
}

#[tokio::test]
async fn test_target_without_active_profile_rejected() {
    let f = fixture();
    f.lifecycle.withdraw_profile(f.bob).await.unwrap();

    let result = f.lifecycle.create_request(f.alice, f.bob, None).await;
    assert!(matches!(result, Err(MatchError::TargetProfileRequired)));
}

#[tokio::test]
async fn test_gender_mismatch_rejected_but_unset_passes() {
    let f = fixture();

    let dan = Uuid::new_v4();
    f.store.add_user(dan, "Dan", Some("male"), "student");
    f.store.add_profile(profile_for(dan));

    let result = f.lifecycle.create_request(f.alice, dan, None).await;
    assert!(matches!(result, Err(MatchError::GenderMismatch)));

    // Unset gender on either side passes the gate
    let sam = Uuid::new_v4();
    f.store.add_user(sam, "Sam", None, "student");
    f.store.add_profile(profile_for(sam));

    assert!(f.lifecycle.create_request(f.alice, sam, None).await.is_ok());
}

#[tokio::test]
async fn test_non_student_target_rejected() {
    let f = fixture();
    let landlord = Uuid::new_v4();
    f.store.add_user(landlord, "Lana", Some("female"), "landlord");
    f.store.add_profile(profile_for(landlord));

    let result = f.lifecycle.create_request(f.alice, landlord, None).await;
    assert!(matches!(result, Err(MatchError::NotEligible)));
}

#[tokio::test]
async fn test_reverse_direction_conflicts_until_deleted() {
    let f = fixture();

    let record = f.lifecycle.create_request(f.alice, f.bob, None).await.unwrap();

    // B -> A blocked while A -> B exists
    let reverse = f.lifecycle.create_request(f.bob, f.alice, None).await;
    assert!(matches!(reverse, Err(MatchError::DuplicatePair)));

    // Either party may delete; then the reverse direction succeeds
    f.lifecycle.withdraw_request(f.bob, record.id).await.unwrap();
    assert!(f.lifecycle.create_request(f.bob, f.alice, None).await.is_ok());
}

#[tokio::test]
async fn test_respond_accept_then_double_respond_fails() {
    let f = fixture();
    let record = f.lifecycle.create_request(f.alice, f.bob, None).await.unwrap();

    let updated = f
        .lifecycle
        .respond(f.bob, record.id, MatchStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(updated.status, MatchStatus::Accepted);
    assert!(updated.responded_at.is_some());

    // Requester was notified of the outcome
    let titles: Vec<String> = f
        .sink
        .delivered
        .lock()
        .unwrap()
        .iter()
        .filter(|(user, _)| *user == f.alice)
        .map(|(_, title)| title.clone())
        .collect();
    assert_eq!(titles, vec!["Match request accepted"]);

    let again = f.lifecycle.respond(f.bob, record.id, MatchStatus::Accepted).await;
    assert!(matches!(again, Err(MatchError::AlreadyResponded)));
}

#[tokio::test]
async fn test_only_target_can_respond() {
    let f = fixture();
    let record = f.lifecycle.create_request(f.alice, f.bob, None).await.unwrap();

    let result = f
        .lifecycle
        .respond(f.alice, record.id, MatchStatus::Rejected)
        .await;
    assert!(matches!(result, Err(MatchError::NotYourMatch)));
}

#[tokio::test]
async fn test_outsider_cannot_delete() {
    let f = fixture();
    let record = f.lifecycle.create_request(f.alice, f.bob, None).await.unwrap();

    let eve = Uuid::new_v4();
    f.store.add_user(eve, "Eve", Some("female"), "student");

    let result = f.lifecycle.withdraw_request(eve, record.id).await;
    assert!(matches!(result, Err(MatchError::NotParticipant)));
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_transition() {
    let store = Arc::new(MemoryStore::default());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.add_user(alice, "Alice", None, "student");
    store.add_user(bob, "Bob", None, "student");
    store.add_profile(profile_for(alice));
    store.add_profile(profile_for(bob));

    let lifecycle = MatchLifecycle::new(
        store.clone(),
        Arc::new(FailingSink),
        ScoringWeights::default(),
    );

    let record = lifecycle.create_request(alice, bob, None).await.unwrap();
    assert_eq!(record.status, MatchStatus::Pending);

    let updated = lifecycle
        .respond(bob, record.id, MatchStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(updated.status, MatchStatus::Rejected);
}

#[tokio::test]
async fn test_list_matches_partitions_and_enriches() {
    let f = fixture();
    let carol = Uuid::new_v4();
    f.store.add_user(carol, "Carol", Some("female"), "student");
    f.store.add_profile(profile_for(carol));

    f.lifecycle.create_request(f.alice, f.bob, None).await.unwrap();
    f.lifecycle.create_request(carol, f.alice, None).await.unwrap();

    let matches = f.lifecycle.list_matches(f.alice).await.unwrap();

    assert_eq!(matches.sent.len(), 1);
    assert_eq!(matches.received.len(), 1);
    assert_eq!(matches.sent[0].counterpart.display_name, "Beth");
    assert_eq!(matches.received[0].counterpart.display_name, "Carol");
    assert!(matches.sent[0].counterpart_profile.is_some());
}

fn search_query(user_id: Uuid) -> SearchQuery {
    SearchQuery {
        user_id,
        university: None,
        budget_min: None,
        budget_max: None,
        sleep_schedule: None,
        study_habits: None,
        smoking_allowed: None,
        pets_allowed: None,
        major: None,
        limit: 20,
        offset: 0,
    }
}

#[tokio::test]
async fn test_search_ranks_by_score_and_excludes_inactive() {
    let f = fixture();

    // Close match: same budget and habits as Alice
    let near = Uuid::new_v4();
    f.store.add_user(near, "Nina", Some("female"), "student");
    f.store.add_profile(profile_for(near));

    // Poor match: disjoint budget, opposite habits
    let far = Uuid::new_v4();
    f.store.add_user(far, "Fran", Some("female"), "student");
    let mut far_profile = profile_for(far);
    far_profile.budget_min = Some(2000);
    far_profile.budget_max = Some(3000);
    far_profile.cleanliness_level = Some(1);
    far_profile.major = Some("Fine Arts".to_string());
    far_profile.interests = vec!["sculpture".to_string()];
    f.store.add_profile(far_profile);

    // Withdrawn: must not appear at all
    let gone = Uuid::new_v4();
    f.store.add_user(gone, "Gwen", Some("female"), "student");
    f.store.add_profile(profile_for(gone));
    f.lifecycle.withdraw_profile(gone).await.unwrap();

    let results = f.lifecycle.search(&search_query(f.alice)).await.unwrap();

    assert!(results.iter().all(|c| c.user_id != gone));
    assert!(results.iter().all(|c| c.user_id != f.alice));
    assert!(results.len() >= 2);
    // Scored descending
    assert!(results.windows(2).all(|w| {
        w[0].compatibility_score >= w[1].compatibility_score
    }));
    assert_eq!(results[0].compatibility_score, Some(95));
}

#[tokio::test]
async fn test_search_without_profile_returns_unscored_recency_order() {
    let f = fixture();
    let carol = Uuid::new_v4();
    f.store.add_user(carol, "Carol", Some("female"), "student");

    let results = f.lifecycle.search(&search_query(carol)).await.unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|c| c.compatibility_score.is_none()));
}

#[tokio::test]
async fn test_search_limit_is_capped_at_50() {
    let f = fixture();

    let mut query = search_query(f.alice);
    query.limit = 500;

    // The lifecycle clamps before hitting the store; with only one other
    // candidate the call just has to succeed
    let results = f.lifecycle.search(&query).await.unwrap();
    assert!(results.len() <= 50);
}

#[tokio::test]
async fn test_upsert_profile_is_idempotent_and_reactivates() {
    let f = fixture();
    f.lifecycle.withdraw_profile(f.alice).await.unwrap();

    let req = UpsertProfileRequest {
        user_id: f.alice,
        university: Some("State University".to_string()),
        budget_min: Some(400),
        budget_max: Some(900),
        cleanliness_level: Some(3),
        noise_level: None,
        sleep_schedule: None,
        study_habits: None,
        smoking_allowed: false,
        pets_allowed: true,
        guest_frequency: GuestFrequency::Often,
        bio: None,
        major: None,
        interests: vec![],
        move_in_date: None,
        preferred_areas: vec![],
        matching_priorities: Some(serde_json::json!({"cleanliness": 5})),
    };

    let first = f.lifecycle.upsert_profile(&req).await.unwrap();
    assert!(first.is_active);
    assert_eq!(first.budget_max, Some(900));
    // matching_priorities round-trips untouched
    assert_eq!(
        first.matching_priorities,
        Some(serde_json::json!({"cleanliness": 5}))
    );

    let second = f.lifecycle.upsert_profile(&req).await.unwrap();
    assert_eq!(second.budget_max, Some(900));
}

#[tokio::test]
async fn test_profile_lookup_for_unknown_user() {
    let f = fixture();

    let result = f.lifecycle.get_profile(Uuid::new_v4()).await;
    assert!(matches!(result, Err(MatchError::ProfileNotFound)));

    let missing = f.lifecycle.withdraw_profile(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(MatchError::ProfileNotFound)));
}
