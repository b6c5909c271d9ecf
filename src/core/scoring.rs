use crate::models::{GuestFrequency, RoommateProfile, ScoringWeights, SleepSchedule, StudyHabits};

/// Calculate a compatibility score (0-100) between two roommate profiles
///
/// Scoring formula (default weights, sum = 100):
/// ```text
/// score = budget_overlap * 25
///       + major_match * 10
///       + shared_interests * 10
///       + cleanliness_proximity * 10
///       + noise_proximity * 10
///       + sleep_schedule * 10
///       + study_habits * 10
///       + smoking_agreement * 5
///       + pets_agreement * 5
///       + guests_compatibility * 5
/// ```
///
/// Each factor is a symmetric distance/overlap function in [0, 1], so the
/// result is the same with the arguments swapped. Fields one side left
/// unset earn neutral credit (50%, or 30% for interests) rather than
/// penalizing the pair. The weighted sum is normalized by the total weight,
/// scaled to 0-100 and rounded, so non-default weights still land on the
/// same scale.
pub fn compatibility_score(
    a: &RoommateProfile,
    b: &RoommateProfile,
    weights: &ScoringWeights,
) -> u8 {
    let accumulated = budget_factor(a, b) * weights.budget
        + major_factor(a.major.as_deref(), b.major.as_deref()) * weights.major
        + interests_factor(&a.interests, &b.interests) * weights.interests
        + level_factor(a.cleanliness_level, b.cleanliness_level) * weights.cleanliness
        + level_factor(a.noise_level, b.noise_level) * weights.noise
        + sleep_factor(a.sleep_schedule, b.sleep_schedule) * weights.sleep
        + study_factor(a.study_habits, b.study_habits) * weights.study
        + agreement_factor(a.smoking_allowed, b.smoking_allowed) * weights.smoking
        + agreement_factor(a.pets_allowed, b.pets_allowed) * weights.pets
        + guests_factor(a.guest_frequency, b.guest_frequency) * weights.guests;

    // Total weight is 100 by default; renormalize explicitly so overridden
    // weights cannot push the score off the 0-100 scale.
    let total = weights.total().max(1.0);
    let score = (accumulated / total * 100.0).round();

    score.clamp(0.0, 100.0) as u8
}

/// Interest tags present in both profiles, in `a`'s order
pub fn shared_interests(a: &RoommateProfile, b: &RoommateProfile) -> Vec<String> {
    a.interests
        .iter()
        .filter(|tag| b.interests.contains(tag))
        .cloned()
        .collect()
}

/// Budget overlap factor (0-1)
///
/// Overlap length of the two ranges over the longer range length. Disjoint
/// ranges floor at 0; a missing or half-filled range on either side is
/// neutral (0.5). The denominator is floored at 1 so zero-length ranges
/// cannot divide by zero; identical non-degenerate ranges score 1.
#[inline]
fn budget_factor(a: &RoommateProfile, b: &RoommateProfile) -> f64 {
    let (Some((a_min, a_max)), Some((b_min, b_max))) = (a.budget_range(), b.budget_range()) else {
        return 0.5;
    };

    let overlap = (a_max.min(b_max) - a_min.max(b_min)).max(0) as f64;
    let longest = ((a_max - a_min).max(b_max - b_min)).max(1) as f64;

    overlap / longest
}

/// Major match factor: exact equality, case-sensitive
#[inline]
fn major_factor(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

/// Shared-interest factor: overlap count over the longer list
#[inline]
fn interests_factor(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.3;
    }

    let shared = a.iter().filter(|tag| b.contains(tag)).count() as f64;
    shared / a.len().max(b.len()) as f64
}

/// Proximity factor for 1-5 scales (cleanliness, noise tolerance)
#[inline]
fn level_factor(a: Option<i16>, b: Option<i16>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => 1.0 - (a - b).abs() as f64 / 4.0,
        _ => 0.5,
    }
}

/// Sleep schedule factor: "normal" is flexible enough for half credit
#[inline]
fn sleep_factor(a: Option<SleepSchedule>, b: Option<SleepSchedule>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(SleepSchedule::Normal), Some(_)) | (Some(_), Some(SleepSchedule::Normal)) => 0.5,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

/// Study habits factor: "mixed" partially accommodates either habit
#[inline]
fn study_factor(a: Option<StudyHabits>, b: Option<StudyHabits>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(StudyHabits::Mixed), Some(_)) | (Some(_), Some(StudyHabits::Mixed)) => 0.7,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

/// Boolean agreement factor (smoking, pets): equal or nothing
#[inline]
fn agreement_factor(a: bool, b: bool) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

/// Guest frequency factor: "sometimes" splits the difference
#[inline]
fn guests_factor(a: GuestFrequency, b: GuestFrequency) -> f64 {
    if a == b {
        1.0
    } else if a == GuestFrequency::Sometimes || b == GuestFrequency::Sometimes {
        0.7
    } else {
        0.0
    }
}
