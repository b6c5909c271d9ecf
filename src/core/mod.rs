// Core algorithm exports
pub mod filters;
pub mod lifecycle;
pub mod scoring;
pub mod store;

pub use filters::{budget_ranges_overlap, genders_compatible, rank_candidates};
pub use lifecycle::{MatchError, MatchLifecycle, MAX_SEARCH_LIMIT};
pub use scoring::{compatibility_score, shared_interests};
pub use store::{MatchingStore, NotificationSink, NotifyError, SearchFilters, StoreError};
