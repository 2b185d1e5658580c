use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::compatibility::is_compatible;
use crate::core::distance::distance_between;
use crate::core::error::EngineError;
use crate::core::scoring::{common_tags, score_candidate};
use crate::models::{BrowseFilters, ScoredCandidate, ScoringWeights, SortKey, UserProfile};

/// Fame rating assumed for filtering and sorting when a profile has none.
/// Matches the scoring default so the two views of a candidate agree.
const DEFAULT_FAME_RATING: f64 = 50.0;

/// Filters and orders a candidate set for one viewer
///
/// # Pipeline stages
/// 1. Exclude self
/// 2. Exclude blocked pairs (either direction)
/// 3. Exclude incompatible pairs (when full gender/preference data is in play)
/// 4. Hard bounds: age, fame, distance
/// 5. Tag exclusion, then interest selection
/// 6. Score and sort
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Rank `candidates` for `viewer`.
    ///
    /// `blocked` is the set of user ids with an active block in either
    /// direction, fetched once per request. Stage order is fixed: the first
    /// failing predicate excludes a candidate without evaluating the rest.
    pub fn rank(
        &self,
        viewer: &UserProfile,
        candidates: Vec<UserProfile>,
        filters: &BrowseFilters,
        sort_key: SortKey,
        blocked: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        validate_filters(filters)?;

        let today = now.date_naive();

        let mut ranked: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| c.user_id != viewer.user_id)
            .filter(|c| !blocked.contains(&c.user_id))
            .filter(|c| !filters.require_compatible || is_compatible(viewer, c))
            .filter(|c| within_age_bounds(c, today, filters))
            .filter(|c| within_fame_bounds(c, filters))
            .filter(|c| within_distance(viewer, c, filters))
            .filter(|c| !has_excluded_tag(c, &filters.exclude_tags))
            .filter(|c| matches_interests(c, &filters.interests))
            .map(|c| self.score(viewer, c, now, today))
            .collect();

        sort_candidates(&mut ranked, sort_key);

        Ok(ranked)
    }

    fn score(
        &self,
        viewer: &UserProfile,
        candidate: UserProfile,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> ScoredCandidate {
        let score = score_candidate(viewer, &candidate, now, &self.weights);

        ScoredCandidate {
            age: candidate.age_on(today),
            distance_km: distance_between(viewer.location, candidate.location),
            common_tags: common_tags(viewer, &candidate),
            score,
            user_id: candidate.user_id,
            username: candidate.username,
            gender: candidate.gender,
            fame_rating: candidate.fame_rating,
            image_file_ids: candidate.image_file_ids,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Reject malformed filter bounds before any filtering runs.
pub fn validate_filters(filters: &BrowseFilters) -> Result<(), EngineError> {
    if let (Some(min), Some(max)) = (filters.age_min, filters.age_max) {
        if min > max {
            return Err(EngineError::Validation(
                "ageMin must not exceed ageMax".to_string(),
            ));
        }
    }

    if let (Some(min), Some(max)) = (filters.fame_min, filters.fame_max) {
        if min > max {
            return Err(EngineError::Validation(
                "fameMin must not exceed fameMax".to_string(),
            ));
        }
    }

    if let Some(distance) = filters.distance_max_km {
        if distance < 0.0 || !distance.is_finite() {
            return Err(EngineError::Validation(
                "distanceMaxKm must be a non-negative number".to_string(),
            ));
        }
    }

    Ok(())
}

#[inline]
fn within_age_bounds(candidate: &UserProfile, today: NaiveDate, filters: &BrowseFilters) -> bool {
    let age = candidate.age_on(today);

    if let Some(min) = filters.age_min {
        if age < min {
            return false;
        }
    }
    if let Some(max) = filters.age_max {
        if age > max {
            return false;
        }
    }
    true
}

#[inline]
fn within_fame_bounds(candidate: &UserProfile, filters: &BrowseFilters) -> bool {
    let fame = candidate.fame_rating.unwrap_or(DEFAULT_FAME_RATING);

    if let Some(min) = filters.fame_min {
        if fame < min {
            return false;
        }
    }
    if let Some(max) = filters.fame_max {
        if fame > max {
            return false;
        }
    }
    true
}

/// Distance bound applies only when both locations are known. A candidate
/// with an unknown distance is never excluded by a distance filter.
#[inline]
fn within_distance(viewer: &UserProfile, candidate: &UserProfile, filters: &BrowseFilters) -> bool {
    match (
        filters.distance_max_km,
        distance_between(viewer.location, candidate.location),
    ) {
        (Some(max), Some(distance)) => distance <= max,
        _ => true,
    }
}

#[inline]
fn has_excluded_tag(candidate: &UserProfile, exclude_tags: &[String]) -> bool {
    exclude_tags.iter().any(|excluded| {
        let excluded = excluded.to_lowercase();
        candidate
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&excluded))
    })
}

/// OR semantics: any interest matching any candidate tag keeps the candidate.
#[inline]
fn matches_interests(candidate: &UserProfile, interests: &[String]) -> bool {
    if interests.is_empty() {
        return true;
    }

    interests.iter().any(|interest| {
        let interest = interest.to_lowercase();
        candidate
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&interest))
    })
}

/// Unknown distance sinks to the bottom for both distance orderings: +inf
/// when ascending, 0 when descending. Vec::sort_by is stable, so ties keep
/// their incoming order.
fn sort_candidates(candidates: &mut [ScoredCandidate], sort_key: SortKey) {
    match sort_key {
        SortKey::Recommended => {
            candidates.sort_by(|a, b| cmp_f64(b.score, a.score));
        }
        SortKey::AgeAsc => candidates.sort_by_key(|c| c.age),
        SortKey::AgeDesc => candidates.sort_by_key(|c| Reverse(c.age)),
        SortKey::DistanceAsc => {
            candidates.sort_by(|a, b| {
                cmp_f64(
                    a.distance_km.unwrap_or(f64::INFINITY),
                    b.distance_km.unwrap_or(f64::INFINITY),
                )
            });
        }
        SortKey::DistanceDesc => {
            candidates.sort_by(|a, b| {
                cmp_f64(b.distance_km.unwrap_or(0.0), a.distance_km.unwrap_or(0.0))
            });
        }
        SortKey::FameAsc => {
            candidates.sort_by(|a, b| {
                cmp_f64(
                    a.fame_rating.unwrap_or(DEFAULT_FAME_RATING),
                    b.fame_rating.unwrap_or(DEFAULT_FAME_RATING),
                )
            });
        }
        SortKey::FameDesc => {
            candidates.sort_by(|a, b| {
                cmp_f64(
                    b.fame_rating.unwrap_or(DEFAULT_FAME_RATING),
                    a.fame_rating.unwrap_or(DEFAULT_FAME_RATING),
                )
            });
        }
        SortKey::TagsDesc => candidates.sort_by_key(|c| Reverse(c.common_tags.len())),
    }
}

#[inline]
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GeoPoint, Preference};
    use chrono::{Datelike, NaiveDate};

    fn profile(id: &str, gender: Gender, preference: Preference) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            username: format!("user_{}", id),
            gender,
            sexual_preference: preference,
            birth_date: NaiveDate::from_ymd_opt(1998, 5, 10).unwrap(),
            location: None,
            fame_rating: Some(50.0),
            tags: vec![],
            last_online: None,
            image_file_ids: vec![],
        }
    }

    fn viewer() -> UserProfile {
        let mut v = profile("viewer", Gender::Female, Preference::Both);
        v.location = Some(GeoPoint::new(48.8566, 2.3522));
        v.tags = vec!["hiking".to_string(), "coffee".to_string()];
        v
    }

    #[test]
    fn test_excludes_self_and_blocked() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut blocked_user = profile("blocked", Gender::Male, Preference::Both);
        blocked_user.fame_rating = Some(90.0);

        let candidates = vec![
            profile("viewer", Gender::Male, Preference::Both), // same id as viewer
            blocked_user,
            profile("ok", Gender::Male, Preference::Both),
        ];

        let blocked: HashSet<String> = ["blocked".to_string()].into_iter().collect();
        let ranked = ranker
            .rank(
                &v,
                candidates,
                &BrowseFilters::default(),
                SortKey::Recommended,
                &blocked,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "ok");
    }

    #[test]
    fn test_compatibility_stage_can_be_skipped() {
        let ranker = Ranker::with_default_weights();
        let v = profile("viewer", Gender::Female, Preference::Male);

        // Not a mutual match: candidate is only interested in women
        let candidates = vec![profile("c", Gender::Male, Preference::Female)];
        let blocked = HashSet::new();

        let strict = ranker
            .rank(
                &v,
                candidates.clone(),
                &BrowseFilters::default(),
                SortKey::Recommended,
                &blocked,
                Utc::now(),
            )
            .unwrap();
        assert!(strict.is_empty());

        let mut coarse = BrowseFilters::default();
        coarse.require_compatible = false;
        let lax = ranker
            .rank(&v, candidates, &coarse, SortKey::Recommended, &blocked, Utc::now())
            .unwrap();
        assert_eq!(lax.len(), 1);
    }

    #[test]
    fn test_age_filter_is_calendar_exact() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();
        let now = Utc::now();
        let today = now.date_naive();

        // Candidate turned 26 ten days ago; an 18-25 filter must exclude them
        let mut too_old = profile("too_old", Gender::Male, Preference::Both);
        too_old.birth_date = (today - chrono::Duration::days(10))
            .with_year(today.year() - 26)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year() - 26, 2, 28).unwrap());

        // Candidate turns 26 in ten days; still 25 today and kept
        let mut still_25 = profile("still_25", Gender::Male, Preference::Both);
        still_25.birth_date = (today + chrono::Duration::days(10))
            .with_year(today.year() - 26)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year() - 26, 3, 1).unwrap());

        let mut filters = BrowseFilters::default();
        filters.age_min = Some(18);
        filters.age_max = Some(25);

        let ranked = ranker
            .rank(
                &v,
                vec![too_old, still_25],
                &filters,
                SortKey::Recommended,
                &HashSet::new(),
                now,
            )
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "still_25");
        assert_eq!(ranked[0].age, 25);
    }

    #[test]
    fn test_fame_bounds() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut famous = profile("famous", Gender::Male, Preference::Both);
        famous.fame_rating = Some(95.0);
        let mut obscure = profile("obscure", Gender::Male, Preference::Both);
        obscure.fame_rating = Some(5.0);

        let mut filters = BrowseFilters::default();
        filters.fame_min = Some(10.0);
        filters.fame_max = Some(90.0);

        let ranked = ranker
            .rank(
                &v,
                vec![famous, obscure, profile("mid", Gender::Male, Preference::Both)],
                &filters,
                SortKey::Recommended,
                &HashSet::new(),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "mid");
    }

    #[test]
    fn test_distance_filter_never_excludes_unknown() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut near = profile("near", Gender::Male, Preference::Both);
        near.location = Some(GeoPoint::new(48.86, 2.36));
        let mut far = profile("far", Gender::Male, Preference::Both);
        far.location = Some(GeoPoint::new(43.30, 5.37)); // Marseille, ~660km
        let nowhere = profile("nowhere", Gender::Male, Preference::Both);

        let mut filters = BrowseFilters::default();
        filters.distance_max_km = Some(100.0);

        let ranked = ranker
            .rank(
                &v,
                vec![near, far, nowhere],
                &filters,
                SortKey::DistanceAsc,
                &HashSet::new(),
                Utc::now(),
            )
            .unwrap();

        let ids: Vec<&str> = ranked.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "nowhere"]);
    }

    #[test]
    fn test_tag_exclusion_and_interest_selection() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut smoker = profile("smoker", Gender::Male, Preference::Both);
        smoker.tags = vec!["Smoking".to_string(), "hiking".to_string()];
        let mut hiker = profile("hiker", Gender::Male, Preference::Both);
        hiker.tags = vec!["Mountain-Hiking".to_string()];
        let mut gamer = profile("gamer", Gender::Male, Preference::Both);
        gamer.tags = vec!["gaming".to_string()];

        let mut filters = BrowseFilters::default();
        filters.exclude_tags = vec!["smok".to_string()];
        filters.interests = vec!["hiking".to_string(), "cooking".to_string()];

        let ranked = ranker
            .rank(
                &v,
                vec![smoker, hiker, gamer],
                &filters,
                SortKey::Recommended,
                &HashSet::new(),
                Utc::now(),
            )
            .unwrap();

        // smoker is excluded by substring match, gamer has no matching interest
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "hiker");
    }

    #[test]
    fn test_unknown_distance_sorts_last_both_directions() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut near = profile("near", Gender::Male, Preference::Both);
        near.location = Some(GeoPoint::new(48.86, 2.36));
        let mut far = profile("far", Gender::Male, Preference::Both);
        far.location = Some(GeoPoint::new(43.30, 5.37));
        let nowhere = profile("nowhere", Gender::Male, Preference::Both);

        let candidates = vec![nowhere.clone(), far.clone(), near.clone()];
        let blocked = HashSet::new();

        let asc = ranker
            .rank(
                &v,
                candidates.clone(),
                &BrowseFilters::default(),
                SortKey::DistanceAsc,
                &blocked,
                Utc::now(),
            )
            .unwrap();
        let asc_ids: Vec<&str> = asc.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(asc_ids, vec!["near", "far", "nowhere"]);

        let desc = ranker
            .rank(
                &v,
                candidates,
                &BrowseFilters::default(),
                SortKey::DistanceDesc,
                &blocked,
                Utc::now(),
            )
            .unwrap();
        let desc_ids: Vec<&str> = desc.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(desc_ids, vec!["far", "near", "nowhere"]);
    }

    #[test]
    fn test_recommended_sorts_by_score_descending() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut strong = profile("strong", Gender::Male, Preference::Both);
        strong.tags = vec!["hiking".to_string(), "coffee".to_string()];
        strong.fame_rating = Some(90.0);
        strong.last_online = Some(Utc::now());

        let weak = profile("weak", Gender::Male, Preference::Both);

        let ranked = ranker
            .rank(
                &v,
                vec![weak, strong],
                &BrowseFilters::default(),
                SortKey::Recommended,
                &HashSet::new(),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ranked[0].user_id, "strong");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let ranker = Ranker::with_default_weights();
        let v = viewer();

        let mut filters = BrowseFilters::default();
        filters.age_min = Some(30);
        filters.age_max = Some(20);

        let result = ranker.rank(
            &v,
            vec![],
            &filters,
            SortKey::Recommended,
            &HashSet::new(),
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let mut filters = BrowseFilters::default();
        filters.distance_max_km = Some(-1.0);
        let result = ranker.rank(
            &v,
            vec![],
            &filters,
            SortKey::Recommended,
            &HashSet::new(),
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}
