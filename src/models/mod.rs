// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateProfile, GuestFrequency, MatchRequest, MatchStatus, RoommateProfile, ScoredCandidate,
    ScoringWeights, SleepSchedule, StudyHabits, UserSummary,
};
pub use requests::{
    CreateMatchRequest, RespondMatchRequest, SearchQuery, UpsertProfileRequest, UserQuery,
};
pub use responses::{ErrorResponse, HealthResponse, MatchView, MatchesResponse, SearchResponse};
