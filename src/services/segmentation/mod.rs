// ============================================
// Segment Classifier
// ============================================
//
// Scores a user against the static traveler-archetype catalog.
//
// Workflow:
// 1. Derive a 7-dimension behavioral summary from the preference profile
//    (budget, group, activity, comfort, age, style, business-mix)
// 2. For every catalog segment, compute the weighted absolute distance
//    across the 7 dimensions and convert it to similarity = 1 - distance
// 3. Return the top-N segments above the minimum score, each annotated
//    with up to 4 human-readable reasons
//
// Zero qualifying segments is a valid outcome, never an error: downstream
// falls back to preference-only or popularity-only scoring.

pub mod bridge;
pub mod catalog;

pub use bridge::SegmentBridge;
pub use catalog::{catalog, profile_for};

use crate::models::{
    BehavioralProfile, PreferenceProfile, SegmentAssignment, SegmentId, SegmentProfile,
    BEHAVIOR_DIMENSIONS,
};
use crate::services::vectorizer::scale_budget;
use chrono::Utc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("unknown segment id: {0}")]
    UnknownSegment(String),
}

pub type Result<T> = std::result::Result<T, SegmentError>;

/// Default dimension weights (sum to 1.0):
/// budget 0.25, group 0.20, activity 0.15, comfort 0.15, age 0.10,
/// style 0.10, business-mix 0.05.
pub const DEFAULT_DIMENSION_WEIGHTS: [f32; BEHAVIOR_DIMENSIONS] =
    [0.25, 0.20, 0.15, 0.15, 0.10, 0.10, 0.05];

const REASON_PROXIMITY_THRESHOLD: f32 = 0.15;
const MAX_REASONS: usize = 4;

pub struct SegmentClassifier {
    max_segments: usize,
    min_score: f32,
    weights: [f32; BEHAVIOR_DIMENSIONS],
}

impl Default for SegmentClassifier {
    fn default() -> Self {
        Self::new(3, 0.3)
    }
}

impl SegmentClassifier {
    pub fn new(max_segments: usize, min_score: f32) -> Self {
        Self {
            max_segments,
            min_score,
            weights: DEFAULT_DIMENSION_WEIGHTS,
        }
    }

    /// Classify a user into the best-matching segments, sorted by score
    /// descending. Ties keep catalog order (deterministic, not meaningful).
    pub fn classify(&self, profile: &PreferenceProfile) -> Vec<SegmentAssignment> {
        let summary = self.behavioral_summary(profile);
        let now = Utc::now();

        let mut assignments: Vec<SegmentAssignment> = catalog()
            .iter()
            .filter_map(|segment| {
                let score = self.similarity(&summary, segment);
                if score < self.min_score {
                    return None;
                }
                Some(SegmentAssignment {
                    segment: segment.id,
                    score,
                    reasons: self.build_reasons(&summary, profile, segment),
                    assigned_at: now,
                })
            })
            .collect();

        // Stable sort keeps catalog order for equal scores.
        assignments.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        assignments.truncate(self.max_segments);

        debug!(
            user_id = %profile.user_id,
            segment_count = assignments.len(),
            top_segment = assignments.first().map(|a| a.segment.as_str()),
            "Segment classification complete"
        );

        assignments
    }

    /// Weighted absolute-distance similarity in [0, 1].
    fn similarity(&self, summary: &BehavioralProfile, segment: &SegmentProfile) -> f32 {
        let user = summary.as_array();
        let target = segment.profile.as_array();

        // Weights sum to 1.0, so the weighted sum is the average distance.
        let avg_distance: f32 = user
            .iter()
            .zip(target.iter())
            .zip(self.weights.iter())
            .map(|((u, t), w)| w * (u - t).abs())
            .sum();

        (1.0 - avg_distance).max(0.0)
    }

    /// Derive the 7-dimension behavioral summary from profile inputs.
    pub fn behavioral_summary(&self, profile: &PreferenceProfile) -> BehavioralProfile {
        BehavioralProfile {
            budget: profile
                .budget_range
                .as_ref()
                .map(|r| scale_budget(r.max))
                .unwrap_or(0.5),
            group: self.group_dimension(profile),
            activity: self.activity_dimension(profile),
            comfort: self.comfort_dimension(profile),
            age: self.age_dimension(profile),
            style: self.style_dimension(profile),
            business_mix: self.business_dimension(profile),
        }
    }

    fn group_dimension(&self, profile: &PreferenceProfile) -> f32 {
        let Some(groups) = profile.group_types.as_ref().filter(|g| !g.is_empty()) else {
            return 0.5;
        };

        let base = groups
            .iter()
            .map(|label| match label.to_lowercase().as_str() {
                "solo" => 0.1,
                "couple" => 0.3,
                "friends" => 0.5,
                "group" => 0.7,
                "family" => 0.95,
                _ => 0.5,
            })
            .fold(0.0f32, f32::max);

        let with_children = groups
            .iter()
            .any(|label| label.to_lowercase().contains("child"));

        if with_children {
            base.max(0.8)
        } else {
            base
        }
    }

    fn activity_dimension(&self, profile: &PreferenceProfile) -> f32 {
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

    fn comfort_dimension(&self, profile: &PreferenceProfile) -> f32 {
        let Some(stays) = profile
            .accommodation_types
            .as_ref()
            .filter(|s| !s.is_empty())
        else {
            return 0.5;
        };

        let sum: f32 = stays
            .iter()
            .map(|label| match label.to_lowercase().as_str() {
                "camping" => 0.1,
                "hostel" => 0.2,
                "guesthouse" => 0.4,
                "apartment" => 0.5,
                "hotel" => 0.65,
                "boutique" => 0.75,
                "cruise" => 0.85,
                "villa" => 0.85,
                "resort" => 0.9,
                _ => 0.5,
            })
            .sum();

        sum / stays.len() as f32
    }

    /// Age is inferred from proxies (accommodation, activity level, travel
    /// types), never given directly. This is a heuristic estimate.
    fn age_dimension(&self, profile: &PreferenceProfile) -> f32 {
        let mut age: f32 = 0.5;

        if let Some(stays) = profile.accommodation_types.as_ref() {
            let lower: Vec<String> = stays.iter().map(|s| s.to_lowercase()).collect();
            if lower.iter().any(|s| s.contains("hostel")) {
                age -= 0.15;
            }
            if lower
                .iter()
                .any(|s| s.contains("resort") || s.contains("cruise"))
            {
                age += 0.1;
            }
        }

        match profile.activity_level.as_deref().map(str::to_lowercase) {
            Some(ref level) if level == "very_high" || level == "very high" => age -= 0.1,
            Some(ref level) if level == "low" => age += 0.1,
            _ => {}
        }

        if let Some(groups) = profile.group_types.as_ref() {
            if groups.iter().any(|g| g.to_lowercase().contains("family")) {
                age += 0.05;
            }
        }

        if let Some(types) = profile.travel_types.as_ref() {
            if types.iter().any(|t| t.to_lowercase().contains("business")) {
                age += 0.05;
            }
        }

        age.clamp(0.15, 0.85)
    }

    /// 0 = independent travel, 1 = organized/packaged travel.
    fn style_dimension(&self, profile: &PreferenceProfile) -> f32 {
        let mut style: f32 = match profile.risk_tolerance.as_deref().map(str::to_lowercase) {
            Some(ref t) if t == "conservative" => 0.8,
            Some(ref t) if t == "adventurous" => 0.2,
            Some(_) => 0.5,
            None => 0.5,
        };

        if let Some(types) = profile.travel_types.as_ref() {
            if types.iter().any(|t| {
                let lower = t.to_lowercase();
                lower.contains("package") || lower.contains("cruise")
            }) {
                style += 0.2;
            }
        }

        style.clamp(0.0, 1.0)
    }

    fn business_dimension(&self, profile: &PreferenceProfile) -> f32 {
        let Some(types) = profile.travel_types.as_ref() else {
            return 0.1;
        };

        let business = types.iter().any(|t| {
            let lower = t.to_lowercase();
            lower.contains("business") || lower.contains("conference") || lower.contains("work")
        });

        if business {
            0.9
        } else {
            0.1
        }
    }

    /// Up to 4 reasons: segment-specific categorical heuristics first, then
    /// dimension-proximity reasons.
    fn build_reasons(
        &self,
        summary: &BehavioralProfile,
        profile: &PreferenceProfile,
        segment: &SegmentProfile,
    ) -> Vec<String> {
        let mut reasons = Vec::new();

        self.categorical_reasons(profile, segment.id, &mut reasons);

        let dimension_labels = [
            ("Budget expectations match this traveler type", summary.budget, segment.profile.budget),
            ("Travel-group profile fits", summary.group, segment.profile.group),
            ("Activity level fits", summary.activity, segment.profile.activity),
            ("Comfort expectations fit", summary.comfort, segment.profile.comfort),
            ("Estimated age range fits", summary.age, segment.profile.age),
            ("Travel style fits", summary.style, segment.profile.style),
            ("Business-travel share fits", summary.business_mix, segment.profile.business_mix),
        ];

        for (label, user, target) in dimension_labels {
            if reasons.len() >= MAX_REASONS {
                break;
            }
            if (user - target).abs() < REASON_PROXIMITY_THRESHOLD {
                reasons.push(label.to_string());
            }
        }

        reasons.truncate(MAX_REASONS);
        reasons
    }

    fn categorical_reasons(
        &self,
        profile: &PreferenceProfile,
        segment: SegmentId,
        reasons: &mut Vec<String>,
    ) {
        let has_stay = |needle: &str| {
            profile
                .accommodation_types
                .as_ref()
                .map(|s| s.iter().any(|v| v.to_lowercase().contains(needle)))
                .unwrap_or(false)
        };
        let has_travel_type = |needle: &str| {
            profile
                .travel_types
                .as_ref()
                .map(|t| t.iter().any(|v| v.to_lowercase().contains(needle)))
                .unwrap_or(false)
        };
        let has_group = |needle: &str| {
            profile
                .group_types
                .as_ref()
                .map(|g| g.iter().any(|v| v.to_lowercase().contains(needle)))
                .unwrap_or(false)
        };

        match segment {
            SegmentId::BudgetBackpacker => {
                if has_stay("hostel") {
                    reasons.push("Hostel accommodation preference".to_string());
                }
            }
            SegmentId::LuxuryTraveler => {
                if has_stay("resort") || has_stay("villa") {
                    reasons.push("Premium accommodation preference".to_string());
                }
            }
            SegmentId::FamilyVacationer => {
                if has_group("family") || has_group("child") {
                    reasons.push("Travels with family".to_string());
                }
            }
            SegmentId::AdventureSeeker => {
                if matches!(
                    profile.activity_level.as_deref().map(str::to_lowercase),
                    Some(ref level) if level == "high" || level == "very_high" || level == "very high"
                ) {
                    reasons.push("High activity level".to_string());
                }
            }
            SegmentId::CulturalExplorer => {
                if has_travel_type("cultural") || has_travel_type("city") {
                    reasons.push("Cultural travel interests".to_string());
                }
            }
            SegmentId::BusinessTraveler => {
                if has_travel_type("business") || has_travel_type("conference") {
                    reasons.push("Business travel in profile".to_string());
                }
            }
            SegmentId::WellnessRelaxer => {
                if matches!(
                    profile.activity_level.as_deref().map(str::to_lowercase),
                    Some(ref level) if level == "low"
                ) {
                    reasons.push("Prefers low-intensity travel".to_string());
                }
            }
            SegmentId::SocialNomad => {
                if has_group("friends") || has_group("group") {
                    reasons.push("Travels in social groups".to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetRange;
    use uuid::Uuid;

    fn backpacker_profile() -> PreferenceProfile {
        PreferenceProfile {
            user_id: Uuid::new_v4(),
            budget_range: Some(BudgetRange {
                min: 100.0,
                max: 600.0,
            }),
            activity_level: Some("high".into()),
            group_types: Some(vec!["solo".into()]),
            accommodation_types: Some(vec!["hostel".into()]),
            risk_tolerance: Some("adventurous".into()),
            travel_types: Some(vec!["nature".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f32 = DEFAULT_DIMENSION_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_classify_backpacker() {
        let classifier = SegmentClassifier::default();
        let assignments = classifier.classify(&backpacker_profile());

        assert!(!assignments.is_empty());
        assert!(assignments.len() <= 3);
        assert_eq!(assignments[0].segment, SegmentId::BudgetBackpacker);
        for assignment in &assignments {
            assert!(assignment.score >= 0.3);
            assert!(assignment.reasons.len() <= 4);
        }
    }

    #[test]
    fn test_scores_sorted_descending() {
        let classifier = SegmentClassifier::new(8, 0.0);
        let assignments = classifier.classify(&backpacker_profile());
        for window in assignments.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn test_no_segment_clears_threshold_returns_empty() {
        // An impossible threshold: empty list, not an error.
        let classifier = SegmentClassifier::new(3, 1.1);
        let assignments = classifier.classify(&backpacker_profile());
        assert!(assignments.is_empty());
    }

    #[test]
    fn test_hostel_reason_for_backpacker() {
        let classifier = SegmentClassifier::default();
        let assignments = classifier.classify(&backpacker_profile());
        let top = &assignments[0];
        assert!(top
            .reasons
            .iter()
            .any(|r| r.contains("Hostel accommodation")));
    }

    #[test]
    fn test_age_is_clamped_heuristic() {
        let classifier = SegmentClassifier::default();
        let summary = classifier.behavioral_summary(&backpacker_profile());
        assert!((0.15..=0.85).contains(&summary.age));
        // Hostel + adventurous pushes the estimate young.
        assert!(summary.age < 0.5);
    }

    #[test]
    fn test_inferred_dimensions_stay_in_bounds_under_stacked_signals() {
        let classifier = SegmentClassifier::default();
        // Stack every adjustment that moves age and style in one direction.
        let profile = PreferenceProfile {
            user_id: Uuid::new_v4(),
            accommodation_types: Some(vec!["hostel".into()]),
            activity_level: Some("very_high".into()),
            risk_tolerance: Some("conservative".into()),
            travel_types: Some(vec!["package".into(), "cruise".into()]),
            ..Default::default()
        };

        let summary = classifier.behavioral_summary(&profile);
        assert!((0.15..=0.85).contains(&summary.age));
        assert!((0.0..=1.0).contains(&summary.style));
        // conservative 0.8 + package/cruise 0.2 hits the upper style bound.
        assert!((summary.style - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_neutral_summary_for_empty_profile() {
        let classifier = SegmentClassifier::default();
        let summary = classifier.behavioral_summary(&PreferenceProfile::default());
        assert_eq!(summary.budget, 0.5);
        assert_eq!(summary.group, 0.5);
        assert_eq!(summary.activity, 0.5);
        assert_eq!(summary.comfort, 0.5);
        assert_eq!(summary.business_mix, 0.1);
    }
}
