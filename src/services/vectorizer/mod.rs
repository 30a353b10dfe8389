// ============================================
// Feature Vectorizer
// ============================================
//
// Maps a raw preference profile onto the fixed 8-axis FeatureVector.
//
// Per-axis rules (each independently computable):
// - climate: average of a fixed label table, unknown labels count as 0.5
// - culture_vs_nature: cultural / (cultural + nature) keyword ratio,
//   activity-interest matches weigh 0.5 vs 1.0 for travel types
// - budget: piecewise scaling of the range maximum
// - activity_level: fixed categorical table
// - group: categorical table with a children override (>= 0.75)
// - urban_vs_rural: urban / (urban + rural) lexicon ratio over destinations
// - gastronomy: additive food-keyword scoring, 0.3 floor, 1.0 cap
// - popularity_affinity: fixed risk-tolerance table
//
// An axis whose source data is absent stays at its documented default.

use crate::models::{FeatureVector, PreferenceProfile};
use crate::utils::keyword_matches;

const CULTURAL_TRAVEL_KEYWORDS: [&str; 7] = [
    "cultural",
    "city_break",
    "city break",
    "museum",
    "historical",
    "heritage",
    "art",
];

const NATURE_TRAVEL_KEYWORDS: [&str; 7] = [
    "nature",
    "hiking",
    "wildlife",
    "mountain",
    "safari",
    "national park",
    "eco",
];

const URBAN_KEYWORDS: [&str; 6] = ["city", "metropol", "downtown", "urban", "capital", "skyline"];

const RURAL_KEYWORDS: [&str; 7] = [
    "village",
    "countryside",
    "island",
    "rural",
    "farm",
    "coast",
    "mountain",
];

const FOOD_KEYWORDS: [&str; 8] = [
    "food",
    "cuisine",
    "culinary",
    "wine",
    "restaurant",
    "tasting",
    "gourmet",
    "cooking",
];

/// Piecewise scaling of a budget-range maximum: <=1000 maps into [0, 0.3],
/// 1000..=3000 into [0.3, 0.7], above that into [0.7, 1.0] capped at 10_000.
/// Shared with the segment classifier's behavioral summary.
pub(crate) fn scale_budget(max: f32) -> f32 {
    let max = max.max(0.0);
    if max <= 1000.0 {
        0.3 * max / 1000.0
    } else if max <= 3000.0 {
        0.3 + 0.4 * (max - 1000.0) / 2000.0
    } else {
        (0.7 + 0.3 * (max - 3000.0) / 7000.0).min(1.0)
    }
}

/// Converts sparse, heterogeneous preference data into a comparable
/// numeric vector. Stateless; construct once and share.
pub struct Vectorizer;

impl Default for Vectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Vectorizer {
    pub fn new() -> Self {
        Self
    }

    pub fn vectorize(&self, profile: &PreferenceProfile) -> FeatureVector {
        FeatureVector::new([
            self.climate_score(profile),
            self.culture_vs_nature_score(profile),
            self.budget_score(profile),
            self.activity_score(profile),
            self.group_score(profile),
            self.urban_vs_rural_score(profile),
            self.gastronomy_score(profile),
            self.popularity_affinity_score(profile),
        ])
    }

    fn climate_score(&self, profile: &PreferenceProfile) -> f32 {
        let Some(climates) = profile.climate_preferences.as_ref().filter(|c| !c.is_empty())
        else {
            return 0.5;
        };

        let sum: f32 = climates
            .iter()
            .map(|label| match label.to_lowercase().as_str() {
                "tropical" => 1.0,
                "hot" => 0.9,
                "arid" | "desert" => 0.85,
                "humid" => 0.75,
                "temperate" => 0.5,
                "cold" => 0.2,
                _ => 0.5,
            })
            .sum();

        sum / climates.len() as f32
    }

    fn culture_vs_nature_score(&self, profile: &PreferenceProfile) -> f32 {
        let empty = Vec::new();
        let travel_types = profile.travel_types.as_ref().unwrap_or(&empty);
        let activities = profile.activity_interests.as_ref().unwrap_or(&empty);

        // Travel types carry full weight, activity interests half weight.
        let cultural = keyword_matches(travel_types, &CULTURAL_TRAVEL_KEYWORDS) as f32
            + 0.5 * keyword_matches(activities, &CULTURAL_TRAVEL_KEYWORDS) as f32;
        let nature = keyword_matches(travel_types, &NATURE_TRAVEL_KEYWORDS) as f32
            + 0.5 * keyword_matches(activities, &NATURE_TRAVEL_KEYWORDS) as f32;

        if cultural + nature == 0.0 {
            return 0.5;
        }

        cultural / (cultural + nature)
    }

    fn budget_score(&self, profile: &PreferenceProfile) -> f32 {
        match profile.budget_range.as_ref() {
            Some(range) => scale_budget(range.max),
            None => 0.5,
        }
    }

    fn activity_score(&self, profile: &PreferenceProfile) -> f32 {
        match profile.activity_level.as_deref() {
            Some(level) => match level.to_lowercase().as_str() {
                "low" => 0.1,
                "moderate" => 0.4,
                "high" => 0.7,
                "very_high" | "very high" => 0.95,
                _ => 0.5,
            },
            None => 0.5,
        }
    }

    fn group_score(&self, profile: &PreferenceProfile) -> f32 {
        let Some(groups) = profile.group_types.as_ref().filter(|g| !g.is_empty()) else {
            return 0.5;
        };

        let base = groups
            .iter()
            .map(|label| match label.to_lowercase().as_str() {
                "solo" => 0.1,
                "couple" => 0.3,
                "friends" => 0.5,
                "group" => 0.6,
                "family" => 0.9,
                _ => 0.5,
            })
            .fold(0.0f32, f32::max);

        // Traveling with children dominates any other group label.
        let with_children = groups.iter().any(|label| {
            let lower = label.to_lowercase();
            lower.contains("child") || lower.contains("kid")
        });

        if with_children {
            base.max(0.75)
        } else {
            base
        }
    }

    fn urban_vs_rural_score(&self, profile: &PreferenceProfile) -> f32 {
        let Some(destinations) = profile
            .preferred_destinations
            .as_ref()
            .filter(|d| !d.is_empty())
        else {
            // Slight urban bias when nothing is known.
            return 0.6;
        };

        let urban = keyword_matches(destinations, &URBAN_KEYWORDS) as f32;
        let rural = keyword_matches(destinations, &RURAL_KEYWORDS) as f32;

        if urban + rural == 0.0 {
            return 0.6;
        }

        urban / (urban + rural)
    }

    fn gastronomy_score(&self, profile: &PreferenceProfile) -> f32 {
        let has_activities = profile
            .activity_interests
            .as_ref()
            .map(|a| !a.is_empty())
            .unwrap_or(false);
        let has_travel_types = profile
            .travel_types
            .as_ref()
            .map(|t| !t.is_empty())
            .unwrap_or(false);

        if !has_activities && !has_travel_types {
            return 0.5;
        }

        let empty = Vec::new();
        let activities = profile.activity_interests.as_ref().unwrap_or(&empty);
        let travel_types = profile.travel_types.as_ref().unwrap_or(&empty);

        let mut score = 0.3;
        score += 0.2 * keyword_matches(activities, &FOOD_KEYWORDS) as f32;
        if keyword_matches(travel_types, &["culinary"]) > 0 {
            score += 0.4;
        }

        score.min(1.0)
    }

    fn popularity_affinity_score(&self, profile: &PreferenceProfile) -> f32 {
        match profile.risk_tolerance.as_deref() {
            Some(tolerance) => match tolerance.to_lowercase().as_str() {
                "conservative" => 0.9,
                "moderate" => 0.6,
                "adventurous" => 0.2,
                _ => 0.6,
            },
            None => 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Axis, BudgetRange};

    fn vectorizer() -> Vectorizer {
        Vectorizer::new()
    }

    #[test]
    fn test_empty_profile_defaults() {
        let v = vectorizer().vectorize(&PreferenceProfile::default());

        assert_eq!(v.get(Axis::Climate), 0.5);
        assert_eq!(v.get(Axis::CultureVsNature), 0.5);
        assert_eq!(v.get(Axis::Budget), 0.5);
        assert_eq!(v.get(Axis::ActivityLevel), 0.5);
        assert_eq!(v.get(Axis::Group), 0.5);
        // Documented non-neutral defaults
        assert_eq!(v.get(Axis::UrbanVsRural), 0.6);
        assert_eq!(v.get(Axis::Gastronomy), 0.5);
        assert_eq!(v.get(Axis::PopularityAffinity), 0.6);
    }

    #[test]
    fn test_climate_average() {
        let profile = PreferenceProfile {
            climate_preferences: Some(vec!["tropical".into(), "cold".into()]),
            ..Default::default()
        };
        let v = vectorizer().vectorize(&profile);
        assert!((v.get(Axis::Climate) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_climate_unknown_label_is_neutral() {
        let profile = PreferenceProfile {
            climate_preferences: Some(vec!["martian".into()]),
            ..Default::default()
        };
        let v = vectorizer().vectorize(&profile);
        assert_eq!(v.get(Axis::Climate), 0.5);
    }

    #[test]
    fn test_budget_monotonic_in_max() {
        let mut previous = -1.0f32;
        for max in [0.0, 500.0, 1000.0, 1500.0, 3000.0, 5000.0, 10_000.0, 50_000.0] {
            let profile = PreferenceProfile {
                budget_range: Some(BudgetRange { min: 0.0, max }),
                ..Default::default()
            };
            let score = vectorizer().vectorize(&profile).get(Axis::Budget);
            assert!(
                score >= previous,
                "budget score decreased at max={max}: {score} < {previous}"
            );
            previous = score;
        }
        assert!(previous <= 1.0);
    }

    #[test]
    fn test_budget_band_boundaries() {
        let score = |max: f32| {
            vectorizer()
                .vectorize(&PreferenceProfile {
                    budget_range: Some(BudgetRange { min: 0.0, max }),
                    ..Default::default()
                })
                .get(Axis::Budget)
        };

        assert!((score(1000.0) - 0.3).abs() < 1e-6);
        assert!((score(3000.0) - 0.7).abs() < 1e-6);
        assert!((score(100_000.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_children_override_forces_group_floor() {
        let profile = PreferenceProfile {
            group_types: Some(vec!["solo".into(), "traveling with children".into()]),
            ..Default::default()
        };
        let v = vectorizer().vectorize(&profile);
        assert!(v.get(Axis::Group) >= 0.75);
    }

    #[test]
    fn test_culture_ratio_with_half_weight_activities() {
        let profile = PreferenceProfile {
            travel_types: Some(vec!["cultural".into()]),
            activity_interests: Some(vec!["hiking".into()]),
            ..Default::default()
        };
        // cultural = 1.0, nature = 0.5 -> 2/3
        let v = vectorizer().vectorize(&profile);
        assert!((v.get(Axis::CultureVsNature) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_gastronomy_additive_and_capped() {
        let profile = PreferenceProfile {
            travel_types: Some(vec!["culinary".into()]),
            activity_interests: Some(vec![
                "wine tasting".into(),
                "street food tour".into(),
                "cooking class".into(),
            ]),
            ..Default::default()
        };
        // 0.3 + 3 * 0.2 + 0.4 = 1.3 -> capped at 1.0
        let v = vectorizer().vectorize(&profile);
        assert!((v.get(Axis::Gastronomy) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gastronomy_floor_with_signal_but_no_matches() {
        let profile = PreferenceProfile {
            activity_interests: Some(vec!["surfing".into()]),
            ..Default::default()
        };
        let v = vectorizer().vectorize(&profile);
        assert!((v.get(Axis::Gastronomy) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_risk_tolerance_mapping() {
        for (tolerance, expected) in [
            ("conservative", 0.9),
            ("moderate", 0.6),
            ("adventurous", 0.2),
        ] {
            let profile = PreferenceProfile {
                risk_tolerance: Some(tolerance.into()),
                ..Default::default()
            };
            let v = vectorizer().vectorize(&profile);
            assert!((v.get(Axis::PopularityAffinity) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_urban_rural_ratio() {
        let profile = PreferenceProfile {
            preferred_destinations: Some(vec![
                "Tokyo city".into(),
                "Tuscan countryside".into(),
                "New York city".into(),
            ]),
            ..Default::default()
        };
        let v = vectorizer().vectorize(&profile);
        assert!((v.get(Axis::UrbanVsRural) - 2.0 / 3.0).abs() < 1e-6);
    }
}
