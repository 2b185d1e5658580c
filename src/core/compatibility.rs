use crate::models::{Gender, Preference, UserProfile};

/// Whether a user with the given preference is interested in the target gender.
///
/// `Both` covers every gender, including non-binary/other.
#[inline]
pub fn interested_in(preference: Preference, gender: Gender) -> bool {
    match preference {
        Preference::Male => gender == Gender::Male,
        Preference::Female => gender == Gender::Female,
        Preference::Both => true,
    }
}

/// Mutual gender/preference eligibility between two users.
///
/// Symmetric by construction: swapping the arguments yields the same result.
/// Self-pairs are excluded by callers before this predicate is asked.
#[inline]
pub fn is_compatible(a: &UserProfile, b: &UserProfile) -> bool {
    interested_in(a.sexual_preference, b.gender) && interested_in(b.sexual_preference, a.gender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile(id: &str, gender: Gender, preference: Preference) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            username: format!("user_{}", id),
            gender,
            sexual_preference: preference,
            birth_date: NaiveDate::from_ymd_opt(1998, 3, 2).unwrap(),
            location: None,
            fame_rating: None,
            tags: vec![],
            last_online: None,
            image_file_ids: vec![],
        }
    }

    #[test]
    fn test_interested_in() {
        assert!(interested_in(Preference::Male, Gender::Male));
        assert!(!interested_in(Preference::Male, Gender::Female));
        assert!(!interested_in(Preference::Male, Gender::Other));
        assert!(interested_in(Preference::Female, Gender::Female));
        assert!(!interested_in(Preference::Female, Gender::Male));
        assert!(interested_in(Preference::Both, Gender::Male));
        assert!(interested_in(Preference::Both, Gender::Female));
        assert!(interested_in(Preference::Both, Gender::Other));
    }

    #[test]
    fn test_compatibility_is_mutual() {
        // She is interested in men, he is interested in women
        let a = profile("a", Gender::Female, Preference::Male);
        let b = profile("b", Gender::Male, Preference::Female);
        assert!(is_compatible(&a, &b));

        // He is interested in men, she is not a match for him
        let c = profile("c", Gender::Male, Preference::Male);
        assert!(!is_compatible(&a, &c));
    }

    #[test]
    fn test_one_sided_interest_is_not_enough() {
        // a is open to anyone, but b is only interested in women
        let a = profile("a", Gender::Male, Preference::Both);
        let b = profile("b", Gender::Female, Preference::Female);
        assert!(!is_compatible(&a, &b));
    }

    #[test]
    fn test_symmetry_over_all_combinations() {
        let genders = [Gender::Male, Gender::Female, Gender::Other];
        let preferences = [Preference::Male, Preference::Female, Preference::Both];

        for ga in genders {
            for pa in preferences {
                for gb in genders {
                    for pb in preferences {
                        let a = profile("a", ga, pa);
                        let b = profile("b", gb, pb);
                        assert_eq!(
                            is_compatible(&a, &b),
                            is_compatible(&b, &a),
                            "asymmetry for {:?}/{:?} vs {:?}/{:?}",
                            ga, pa, gb, pb
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_both_pref_includes_other_gender() {
        let a = profile("a", Gender::Other, Preference::Both);
        let b = profile("b", Gender::Female, Preference::Both);
        assert!(is_compatible(&a, &b));
    }
}
