use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Gender as declared on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Normalize a free-form profile string into a closed variant.
    ///
    /// Profiles arrive with whatever the registration form accepted, so
    /// synonyms are folded here once instead of string-comparing everywhere.
    /// Unrecognized values map to `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "male" | "man" | "men" => Gender::Male,
            "female" | "woman" | "women" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

/// Declared sexual preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Male,
    Female,
    Both,
}

impl Preference {
    /// Normalize a free-form preference string.
    ///
    /// An empty or unrecognized preference means the user is open to any
    /// gender, so everything that is not clearly male/female folds to `Both`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "male" | "man" | "men" => Preference::Male,
            "female" | "woman" | "women" => Preference::Female,
            _ => Preference::Both,
        }
    }
}

/// WGS84 decimal-degree coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude must fall in [-90, 90] and longitude in [-180, 180].
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// User profile with the fields the engine reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    pub gender: Gender,
    #[serde(rename = "sexualPreference")]
    pub sexual_preference: Preference,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "fameRating", default)]
    pub fame_rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "lastOnline", default)]
    pub last_online: Option<DateTime<Utc>>,
    #[serde(rename = "imageFileIds", default)]
    pub image_file_ids: Vec<String>,
}

impl UserProfile {
    /// Photo slot 0 is the profile's main photo; its presence gates liking.
    pub fn has_main_photo(&self) -> bool {
        !self.image_file_ids.is_empty()
    }

    /// Calendar-exact age in whole years as of `today`.
    ///
    /// Year difference, minus one if today's month/day still precedes the
    /// birthday. Not floor-of-days/365.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }
}

/// Read-only view of a viewer/target pair, recomputed on every read.
///
/// `matched` is always derived from the two like edges, never stored, so it
/// cannot drift out of sync with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub matched: bool,
    pub liked: bool,
    #[serde(rename = "likedBack")]
    pub liked_back: bool,
}

/// Result of a like transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub matched: bool,
}

/// Secondary ordering for browse results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Recommended,
    AgeAsc,
    AgeDesc,
    DistanceAsc,
    DistanceDesc,
    FameAsc,
    FameDesc,
    TagsDesc,
}

/// Hard filters applied to a browse candidate set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseFilters {
    #[serde(rename = "ageMin", default)]
    pub age_min: Option<i32>,
    #[serde(rename = "ageMax", default)]
    pub age_max: Option<i32>,
    #[serde(rename = "fameMin", default)]
    pub fame_min: Option<f64>,
    #[serde(rename = "fameMax", default)]
    pub fame_max: Option<f64>,
    #[serde(rename = "distanceMaxKm", default)]
    pub distance_max_km: Option<f64>,
    #[serde(rename = "excludeTags", default)]
    pub exclude_tags: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Enforce mutual gender/preference eligibility. Endpoints that feed the
    /// ranker from an already-compatible candidate query can turn this off.
    #[serde(rename = "requireCompatible", default = "default_true")]
    pub require_compatible: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BrowseFilters {
    fn default() -> Self {
        Self {
            age_min: None,
            age_max: None,
            fame_min: None,
            fame_max: None,
            distance_max_km: None,
            exclude_tags: Vec::new(),
            interests: Vec::new(),
            require_compatible: true,
        }
    }
}

/// A candidate that survived filtering, with its computed score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    pub gender: Gender,
    pub age: i32,
    #[serde(rename = "fameRating")]
    pub fame_rating: Option<f64>,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "commonTags")]
    pub common_tags: Vec<String>,
    pub score: f64,
    #[serde(rename = "imageFileIds")]
    pub image_file_ids: Vec<String>,
}

/// Scoring weights
///
/// The four components sum to 100 at their defaults; each term is already
/// bounded by its own formula.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub tags: f64,
    pub distance: f64,
    pub fame: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tags: 40.0,
            distance: 30.0,
            fame: 20.0,
            recency: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_synonyms() {
        assert_eq!(Gender::parse("Male"), Gender::Male);
        assert_eq!(Gender::parse("men"), Gender::Male);
        assert_eq!(Gender::parse("WOMAN"), Gender::Female);
        assert_eq!(Gender::parse("non-binary"), Gender::Other);
        assert_eq!(Gender::parse(""), Gender::Other);
    }

    #[test]
    fn test_preference_synonyms() {
        assert_eq!(Preference::parse("men"), Preference::Male);
        assert_eq!(Preference::parse("women"), Preference::Female);
        assert_eq!(Preference::parse("bisexual"), Preference::Both);
        assert_eq!(Preference::parse("bi"), Preference::Both);
        assert_eq!(Preference::parse(""), Preference::Both);
        assert_eq!(Preference::parse("anything"), Preference::Both);
    }

    #[test]
    fn test_age_on_before_and_after_birthday() {
        let profile = UserProfile {
            user_id: "u1".to_string(),
            username: "test".to_string(),
            gender: Gender::Female,
            sexual_preference: Preference::Both,
            birth_date: NaiveDate::from_ymd_opt(2000, 6, 15).unwrap(),
            location: None,
            fame_rating: None,
            tags: vec![],
            last_online: None,
            image_file_ids: vec![],
        };

        // Day before the birthday
        let before = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        assert_eq!(profile.age_on(before), 25);

        // On the birthday
        let on = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(profile.age_on(on), 26);
    }

    #[test]
    fn test_geo_point_range() {
        assert!(GeoPoint::new(40.7128, -74.0060).in_range());
        assert!(!GeoPoint::new(91.0, 0.0).in_range());
        assert!(!GeoPoint::new(0.0, -181.0).in_range());
    }

    #[test]
    fn test_sort_key_parses_kebab_case() {
        let key: SortKey = serde_json::from_str("\"distance-asc\"").unwrap();
        assert_eq!(key, SortKey::DistanceAsc);
        let key: SortKey = serde_json::from_str("\"recommended\"").unwrap();
        assert_eq!(key, SortKey::Recommended);
    }
}
