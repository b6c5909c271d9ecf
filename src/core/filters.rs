use crate::core::scoring::{compatibility_score, shared_interests};
use crate::models::{CandidateProfile, RoommateProfile, ScoredCandidate, ScoringWeights};

/// Gender gate for match requests
///
/// Both set and different blocks the pair; either side unset passes.
#[inline]
pub fn genders_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Budget-range overlap test used by the search filter
#[inline]
pub fn budget_ranges_overlap(
    filter_min: Option<i32>,
    filter_max: Option<i32>,
    profile: &RoommateProfile,
) -> bool {
    let min_ok = match (filter_max, profile.budget_min) {
        (Some(max), Some(candidate_min)) => candidate_min <= max,
        _ => true,
    };
    let max_ok = match (filter_min, profile.budget_max) {
        (Some(min), Some(candidate_max)) => candidate_max >= min,
        _ => true,
    };

    min_ok && max_ok
}

/// Score and rank candidates against the requester's profile
///
/// With a requester profile, every candidate is scored and the page is
/// sorted by score descending. Without one, scores stay None and the
/// storage order (recency) is kept.
pub fn rank_candidates(
    requester: Option<&RoommateProfile>,
    candidates: Vec<CandidateProfile>,
    weights: &ScoringWeights,
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let (score, shared) = match requester {
                Some(mine) => (
                    Some(compatibility_score(mine, &candidate.profile, weights)),
                    shared_interests(mine, &candidate.profile),
                ),
                None => (None, vec![]),
            };

            let p = candidate.profile;
            ScoredCandidate {
                user_id: p.user_id,
                display_name: candidate.display_name,
                university: p.university,
                major: p.major,
                budget_min: p.budget_min,
                budget_max: p.budget_max,
                cleanliness_level: p.cleanliness_level,
                noise_level: p.noise_level,
                sleep_schedule: p.sleep_schedule,
                study_habits: p.study_habits,
                smoking_allowed: p.smoking_allowed,
                pets_allowed: p.pets_allowed,
                guest_frequency: p.guest_frequency,
                bio: p.bio,
                interests: p.interests,
                preferred_areas: p.preferred_areas,
                move_in_date: p.move_in_date,
                compatibility_score: score,
                shared_interests: shared,
            }
        })
        .collect();

    if requester.is_some() {
        ranked.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    }

    ranked
}
