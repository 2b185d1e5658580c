use chrono::{DateTime, Utc};

use crate::core::distance::distance_between;
use crate::models::{ScoringWeights, UserProfile};

/// Distance assumed when either profile has no known location, in meters
const DEFAULT_DISTANCE_M: f64 = 50_000.0;
/// Distances at or beyond this earn no distance credit, in meters
const MAX_SCORED_DISTANCE_M: f64 = 100_000.0;
/// Fame rating assumed when a profile has none
const DEFAULT_FAME_RATING: f64 = 50.0;
/// Activity older than this earns no recency credit
const RECENCY_WINDOW_HOURS: f64 = 24.0;

/// Candidate tags that case-insensitively match any viewer tag.
///
/// Counted from the candidate's list, so a duplicate spelling on the
/// candidate side counts twice. Intentionally not symmetric between the two
/// tag sets.
pub fn common_tags(viewer: &UserProfile, candidate: &UserProfile) -> Vec<String> {
    let viewer_tags: Vec<String> = viewer.tags.iter().map(|t| t.to_lowercase()).collect();

    candidate
        .tags
        .iter()
        .filter(|tag| viewer_tags.contains(&tag.to_lowercase()))
        .cloned()
        .collect()
}

/// Calculate a candidate's desirability score (0-100) relative to a viewer
///
/// Scoring formula, at default weights:
/// ```text
/// score = tag_overlap   * 40    # shared interests, normalized by the smaller tag list
///       + distance_term * 30    # 100km scored window, unknown distance = 50km
///       + fame_term     * 20    # fame rating / 100, missing = 50
///       + recency_term  * 10    # 24h online window, missing lastOnline = no credit
/// ```
///
/// Missing optional fields never fail the computation; each term substitutes
/// its documented default. The final result is clamped to [0, 100].
pub fn score_candidate(
    viewer: &UserProfile,
    candidate: &UserProfile,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> f64 {
    let tag_score = {
        let common = common_tags(viewer, candidate).len() as f64;
        let denominator = viewer.tags.len().min(candidate.tags.len()).max(1) as f64;
        (common / denominator) * weights.tags
    };

    let distance_m = distance_between(viewer.location, candidate.location)
        .map(|km| km * 1000.0)
        .unwrap_or(DEFAULT_DISTANCE_M);
    let distance_score = ((MAX_SCORED_DISTANCE_M - distance_m.min(MAX_SCORED_DISTANCE_M))
        / MAX_SCORED_DISTANCE_M)
        * weights.distance;

    let fame_score =
        (candidate.fame_rating.unwrap_or(DEFAULT_FAME_RATING) / 100.0) * weights.fame;

    let recency_score = match candidate.last_online {
        Some(last_online) => {
            let hours = (now - last_online).num_seconds() as f64 / 3600.0;
            let hours = hours.clamp(0.0, RECENCY_WINDOW_HOURS);
            ((RECENCY_WINDOW_HOURS - hours) / RECENCY_WINDOW_HOURS) * weights.recency
        }
        None => 0.0,
    };

    (tag_score + distance_score + fame_score + recency_score).clamp(0.0, 100.0)
}
