//! nest-match - Roommate matching service for the UniNest student-housing
//! platform
//!
//! This library provides the compatibility scoring algorithm and the match
//! request lifecycle (pending -> accepted/rejected) behind UniNest's
//! roommate feature. The scorer is a pure function and the lifecycle
//! manager takes its storage and notification dependencies by injection,
//! so both are usable without the HTTP layer.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    compatibility_score, shared_interests, MatchError, MatchLifecycle, MatchingStore,
    NotificationSink, SearchFilters, StoreError,
};
pub use crate::models::{
    GuestFrequency, MatchRequest, MatchStatus, RoommateProfile, ScoredCandidate, ScoringWeights,
    SleepSchedule, StudyHabits, UserSummary,
};
