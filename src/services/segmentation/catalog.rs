//! Static traveler-archetype catalog. Built once at process start and never
//! mutated; entries are stored in [`SegmentId::ALL`] order so lookups by
//! segment id are total.

use crate::models::{BehavioralProfile, FeatureVector, SegmentId, SegmentProfile};
use once_cell::sync::Lazy;

static CATALOG: Lazy<Vec<SegmentProfile>> = Lazy::new(build_catalog);

/// The full segment catalog, in [`SegmentId::ALL`] order.
pub fn catalog() -> &'static [SegmentProfile] {
    &CATALOG
}

/// Catalog entry for a segment. Total over the enum: every variant has an
/// entry at its `SegmentId::index()` position.
pub fn profile_for(id: SegmentId) -> &'static SegmentProfile {
    &CATALOG[id.index()]
}

fn entry(
    id: SegmentId,
    description: &str,
    profile: BehavioralProfile,
    prototype: [f32; 8],
    preferred_types: &[&str],
    examples: &[&str],
) -> SegmentProfile {
    SegmentProfile {
        id,
        description: description.to_string(),
        profile,
        prototype: FeatureVector::new(prototype),
        preferred_destination_types: preferred_types.iter().map(|s| s.to_string()).collect(),
        example_destinations: examples.iter().map(|s| s.to_string()).collect(),
    }
}

// Prototype axis order:
// [climate, culture_vs_nature, budget, activity, group, urban, gastronomy, popularity_affinity]
fn build_catalog() -> Vec<SegmentProfile> {
    vec![
        entry(
            SegmentId::BudgetBackpacker,
            "Young cost-conscious traveler favoring hostels and long trips",
            BehavioralProfile {
                budget: 0.15,
                group: 0.2,
                activity: 0.7,
                comfort: 0.2,
                age: 0.3,
                style: 0.2,
                business_mix: 0.05,
            },
            [0.7, 0.5, 0.15, 0.7, 0.2, 0.5, 0.3, 0.25],
            &["hostel_hub", "nature", "beach"],
            &["Bangkok", "Hanoi", "La Paz"],
        ),
        entry(
            SegmentId::LuxuryTraveler,
            "Comfort-first traveler with a high budget and premium expectations",
            BehavioralProfile {
                budget: 0.95,
                group: 0.4,
                activity: 0.3,
                comfort: 0.95,
                age: 0.6,
                style: 0.8,
                business_mix: 0.1,
            },
            [0.8, 0.5, 0.95, 0.3, 0.4, 0.6, 0.9, 0.8],
            &["resort", "island", "city"],
            &["Maldives", "Dubai", "St. Moritz"],
        ),
        entry(
            SegmentId::FamilyVacationer,
            "Travels with children; values safety, convenience and kid-friendly stays",
            BehavioralProfile {
                budget: 0.5,
                group: 0.95,
                activity: 0.4,
                comfort: 0.7,
                age: 0.55,
                style: 0.7,
                business_mix: 0.05,
            },
            [0.75, 0.4, 0.5, 0.4, 0.95, 0.5, 0.4, 0.8],
            &["beach", "theme_park", "resort"],
            &["Mallorca", "Orlando", "Algarve"],
        ),
        entry(
            SegmentId::AdventureSeeker,
            "High-activity traveler drawn to remote nature and physical challenge",
            BehavioralProfile {
                budget: 0.4,
                group: 0.3,
                activity: 0.95,
                comfort: 0.3,
                age: 0.3,
                style: 0.2,
                business_mix: 0.05,
            },
            [0.5, 0.2, 0.4, 0.95, 0.3, 0.2, 0.3, 0.2],
            &["mountain", "nature", "expedition"],
            &["Patagonia", "Nepal", "Iceland"],
        ),
        entry(
            SegmentId::CulturalExplorer,
            "City and heritage oriented traveler; museums, history, local cuisine",
            BehavioralProfile {
                budget: 0.55,
                group: 0.4,
                activity: 0.55,
                comfort: 0.55,
                age: 0.55,
                style: 0.5,
                business_mix: 0.1,
            },
            [0.5, 0.95, 0.55, 0.5, 0.4, 0.8, 0.7, 0.5],
            &["city", "heritage", "museum"],
            &["Rome", "Kyoto", "Cairo"],
        ),
        entry(
            SegmentId::BusinessTraveler,
            "Work-driven trips; urban hubs, efficiency and comfort over leisure",
            BehavioralProfile {
                budget: 0.7,
                group: 0.1,
                activity: 0.3,
                comfort: 0.8,
                age: 0.6,
                style: 0.7,
                business_mix: 0.95,
            },
            [0.5, 0.6, 0.7, 0.2, 0.1, 0.95, 0.6, 0.7],
            &["city", "conference"],
            &["Frankfurt", "Singapore", "London"],
        ),
        entry(
            SegmentId::WellnessRelaxer,
            "Rest-seeking traveler; spas, calm resorts, low activity",
            BehavioralProfile {
                budget: 0.65,
                group: 0.35,
                activity: 0.1,
                comfort: 0.9,
                age: 0.6,
                style: 0.6,
                business_mix: 0.05,
            },
            [0.8, 0.3, 0.65, 0.1, 0.35, 0.3, 0.6, 0.6],
            &["spa", "resort", "island"],
            &["Bali", "Tulum", "Santorini"],
        ),
        entry(
            SegmentId::SocialNomad,
            "Gregarious traveler chasing nightlife, events and shared experiences",
            BehavioralProfile {
                budget: 0.35,
                group: 0.6,
                activity: 0.75,
                comfort: 0.4,
                age: 0.25,
                style: 0.3,
                business_mix: 0.1,
            },
            [0.7, 0.5, 0.35, 0.75, 0.5, 0.7, 0.5, 0.4],
            &["city", "beach", "nightlife"],
            &["Barcelona", "Berlin", "Rio de Janeiro"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_segment_in_order() {
        assert_eq!(catalog().len(), SegmentId::ALL.len());
        for (i, id) in SegmentId::ALL.iter().enumerate() {
            assert_eq!(catalog()[i].id, *id);
            assert_eq!(profile_for(*id).id, *id);
        }
    }

    #[test]
    fn test_catalog_values_are_normalized() {
        for segment in catalog() {
            for value in segment.profile.as_array() {
                assert!((0.0..=1.0).contains(&value), "{:?}", segment.id);
            }
            for value in segment.prototype.as_slice() {
                assert!((0.0..=1.0).contains(value), "{:?}", segment.id);
            }
            assert!(!segment.preferred_destination_types.is_empty());
        }
    }
}
