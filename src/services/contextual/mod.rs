// ============================================
// Contextual Weighting Engine
// ============================================
//
// Applies non-destructive weather/season multipliers on top of a base
// score. Four independent sub-weights, each individually bounded:
//
// - weather match   [0.8, 1.2]  temperature vs climate axis, storm penalty
// - seasonal fit    [0.85, 1.1] activity axis vs season, school-holiday bonus
// - travel season   [0.85, 1.1] budget axis vs high/low/shoulder pricing
// - outdoor boost   [0.8, 1.2]  activity axis vs outdoor-friendliness
//
// The final multiplier is their product clamped to [0.7, 1.3] and is
// applied multiplicatively, never replacing the base score. Base scores
// below 0.2 skip the adjustment entirely (multiplier forced to 1.0) to
// avoid amplifying noise.

use crate::models::{Axis, ContextualBreakdown, ContextualScore, FeatureVector};
use serde::{Deserialize, Serialize};

const MULTIPLIER_MIN: f32 = 0.7;
const MULTIPLIER_MAX: f32 = 1.3;
const MIN_BASE_SCORE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Storm,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelSeason {
    High,
    Shoulder,
    Low,
}

/// Destination weather plus seasonal context for one scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelContext {
    pub temperature_c: f32,
    pub condition: WeatherCondition,
    pub season: Season,
    pub travel_season: TravelSeason,
    pub school_holiday: bool,
    pub outdoor_friendly: bool,
}

pub struct ContextualWeightingEngine;

impl Default for ContextualWeightingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextualWeightingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        base_score: f32,
        user: &FeatureVector,
        context: &TravelContext,
    ) -> ContextualScore {
        if base_score < MIN_BASE_SCORE {
            let breakdown = ContextualBreakdown {
                weather_match: 1.0,
                seasonal_fit: 1.0,
                travel_season: 1.0,
                outdoor_boost: 1.0,
            };
            return ContextualScore {
                original: base_score,
                multiplier: 1.0,
                final_score: base_score.min(1.0),
                breakdown,
                summary: "base score below threshold, context skipped".to_string(),
            };
        }

        let breakdown = ContextualBreakdown {
            weather_match: self.weather_match(user, context),
            seasonal_fit: self.seasonal_fit(user, context),
            travel_season: self.travel_season_weight(user, context),
            outdoor_boost: self.outdoor_boost(user, context),
        };

        let multiplier = (breakdown.weather_match
            * breakdown.seasonal_fit
            * breakdown.travel_season
            * breakdown.outdoor_boost)
            .clamp(MULTIPLIER_MIN, MULTIPLIER_MAX);

        let final_score = (base_score * multiplier).min(1.0);

        ContextualScore {
            original: base_score,
            multiplier,
            final_score,
            summary: format!(
                "context multiplier {:.2} (weather {:.2}, season {:.2}, pricing {:.2}, outdoor {:.2})",
                multiplier,
                breakdown.weather_match,
                breakdown.seasonal_fit,
                breakdown.travel_season,
                breakdown.outdoor_boost
            ),
            breakdown,
        }
    }

    /// Temperature vs the user's climate-axis preference, penalized for
    /// storms, rain and snow. Bounded [0.8, 1.2].
    fn weather_match(&self, user: &FeatureVector, context: &TravelContext) -> f32 {
        // Climate axis 0 (cold) prefers ~10C, axis 1 (tropical) ~30C.
        let ideal_temp = 10.0 + 20.0 * user.get(Axis::Climate);
        let deviation = ((context.temperature_c - ideal_temp).abs() / 25.0).min(1.0);
        let mut weight = 1.2 - 0.4 * deviation;

        weight -= match context.condition {
            WeatherCondition::Storm => 0.15,
            WeatherCondition::Rain | WeatherCondition::Snow => 0.1,
            WeatherCondition::Clear | WeatherCondition::Clouds => 0.0,
        };

        weight.clamp(0.8, 1.2)
    }

    /// Activity axis vs the current season, with a school-holiday bonus for
    /// family-leaning vectors. Bounded [0.85, 1.1].
    fn seasonal_fit(&self, user: &FeatureVector, context: &TravelContext) -> f32 {
        let activity = user.get(Axis::ActivityLevel);
        let mut weight = match context.season {
            // Summer favors active travel, winter favors restful travel.
            Season::Summer => 1.0 + 0.2 * (activity - 0.5),
            Season::Winter => 1.0 + 0.2 * (0.5 - activity),
            Season::Spring | Season::Autumn => 1.0,
        };

        if context.school_holiday && user.get(Axis::Group) >= 0.6 {
            weight += 0.05;
        }

        weight.clamp(0.85, 1.1)
    }

    /// Budget axis vs seasonal pricing dynamics. Economy-leaning users are
    /// penalized in high season and favored in low season. Bounded
    /// [0.85, 1.1].
    fn travel_season_weight(&self, user: &FeatureVector, context: &TravelContext) -> f32 {
        let economy_lean = 1.0 - user.get(Axis::Budget);
        let weight = match context.travel_season {
            TravelSeason::High => 1.0 - 0.15 * economy_lean,
            TravelSeason::Shoulder => 1.0 + 0.05 * economy_lean,
            TravelSeason::Low => 1.0 + 0.1 * economy_lean,
        };
        weight.clamp(0.85, 1.1)
    }

    /// Activity axis vs the destination's outdoor-friendliness flag.
    /// Bounded [0.8, 1.2].
    fn outdoor_boost(&self, user: &FeatureVector, context: &TravelContext) -> f32 {
        let activity = user.get(Axis::ActivityLevel);
        let weight = if context.outdoor_friendly {
            1.0 + 0.4 * (activity - 0.5)
        } else {
            1.0 - 0.2 * (activity - 0.5)
        };
        weight.clamp(0.8, 1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TravelContext {
        TravelContext {
            temperature_c: 25.0,
            condition: WeatherCondition::Clear,
            season: Season::Summer,
            travel_season: TravelSeason::Shoulder,
            school_holiday: false,
            outdoor_friendly: true,
        }
    }

    fn adventurous_tropical() -> FeatureVector {
        FeatureVector::new([0.9, 0.3, 0.5, 0.9, 0.2, 0.4, 0.5, 0.3])
    }

    #[test]
    fn test_multiplier_always_within_bounds() {
        let engine = ContextualWeightingEngine::new();

        let contexts = [
            context(),
            TravelContext {
                temperature_c: -20.0,
                condition: WeatherCondition::Storm,
                season: Season::Winter,
                travel_season: TravelSeason::High,
                school_holiday: true,
                outdoor_friendly: false,
            },
            TravelContext {
                temperature_c: 45.0,
                condition: WeatherCondition::Clear,
                season: Season::Summer,
                travel_season: TravelSeason::Low,
                school_holiday: true,
                outdoor_friendly: true,
            },
        ];

        for ctx in contexts {
            for vector in [
                FeatureVector::new([0.0; 8]),
                FeatureVector::new([1.0; 8]),
                adventurous_tropical(),
            ] {
                let scored = engine.apply(0.8, &vector, &ctx);
                assert!((0.7..=1.3).contains(&scored.multiplier), "{:?}", scored);
                assert!(scored.final_score <= 1.0);
            }
        }
    }

    #[test]
    fn test_low_base_score_skips_adjustment() {
        let engine = ContextualWeightingEngine::new();
        let scored = engine.apply(0.19, &adventurous_tropical(), &context());
        assert_eq!(scored.multiplier, 1.0);
        assert_eq!(scored.final_score, 0.19);
    }

    #[test]
    fn test_good_weather_boosts_matching_user() {
        let engine = ContextualWeightingEngine::new();
        // Warm clear summer, outdoor destination, adventurous tropical user
        let scored = engine.apply(0.6, &adventurous_tropical(), &context());
        assert!(scored.multiplier > 1.0, "{:?}", scored);
        assert!(scored.final_score > scored.original);
    }

    #[test]
    fn test_storm_penalizes_weather_match() {
        let engine = ContextualWeightingEngine::new();
        let clear = engine.apply(0.6, &adventurous_tropical(), &context());
        let stormy = engine.apply(
            0.6,
            &adventurous_tropical(),
            &TravelContext {
                condition: WeatherCondition::Storm,
                ..context()
            },
        );
        assert!(stormy.breakdown.weather_match < clear.breakdown.weather_match);
    }

    #[test]
    fn test_high_season_penalizes_economy_budget() {
        let engine = ContextualWeightingEngine::new();
        let economy = FeatureVector::new([0.5, 0.5, 0.1, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let high = engine.apply(
            0.6,
            &economy,
            &TravelContext {
                travel_season: TravelSeason::High,
                ..context()
            },
        );
        let low = engine.apply(
            0.6,
            &economy,
            &TravelContext {
                travel_season: TravelSeason::Low,
                ..context()
            },
        );
        assert!(high.breakdown.travel_season < 1.0);
        assert!(low.breakdown.travel_season > 1.0);
    }

    #[test]
    fn test_final_score_never_exceeds_one() {
        let engine = ContextualWeightingEngine::new();
        let scored = engine.apply(0.95, &adventurous_tropical(), &context());
        assert!(scored.final_score <= 1.0);
    }
}
