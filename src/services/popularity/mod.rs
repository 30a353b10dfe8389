// ============================================
// Popularity Engine
// ============================================
//
// Composes six normalized [0, 1] sub-scores per destination:
//
// bookings 0.40, searches 0.15, views 0.10, quality 0.20, trend 0.10,
// seasonality 0.05 (weights sum to 1.0)
//
// - bookings/searches/views: min-max normalized against the catalog's
//   observed range at computation time (batch job, not per-request)
// - quality: Wilson-score lower bound (95%, z = 1.96) over rating/5 with
//   review count as sample size; 0 when there are no reviews
// - trend: growth rate through a fixed piecewise map
// - seasonality: externally supplied boost
//
// The weighted sum is multiplied by a recency-decay factor (120-day
// half-life from the last booking, floored at 0.3; 0.5 when no last
// booking is known) and clamped to [0, 1].

use crate::models::{DestinationStats, PopularityComponents, PopularityScore};
use crate::utils::{half_life_decay, normalize_score};
use chrono::{DateTime, Utc};
use tracing::debug;

const BOOKINGS_WEIGHT: f32 = 0.40;
const SEARCHES_WEIGHT: f32 = 0.15;
const VIEWS_WEIGHT: f32 = 0.10;
const QUALITY_WEIGHT: f32 = 0.20;
const TREND_WEIGHT: f32 = 0.10;
const SEASONALITY_WEIGHT: f32 = 0.05;

const WILSON_Z: f32 = 1.96;
const RECENCY_HALF_LIFE_DAYS: f32 = 120.0;
const RECENCY_DECAY_FLOOR: f32 = 0.3;
const RECENCY_DECAY_UNKNOWN: f32 = 0.5;

/// Observed catalog-wide signal ranges used for min-max normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalRanges {
    pub bookings: (f32, f32),
    pub searches: (f32, f32),
    pub views: (f32, f32),
}

impl SignalRanges {
    pub fn from_stats(stats: &[DestinationStats]) -> Self {
        let mut ranges = SignalRanges {
            bookings: (f32::MAX, f32::MIN),
            searches: (f32::MAX, f32::MIN),
            views: (f32::MAX, f32::MIN),
        };

        if stats.is_empty() {
            return SignalRanges::default();
        }

        for s in stats {
            let b = s.bookings as f32;
            let q = s.searches as f32;
            let v = s.views as f32;
            ranges.bookings = (ranges.bookings.0.min(b), ranges.bookings.1.max(b));
            ranges.searches = (ranges.searches.0.min(q), ranges.searches.1.max(q));
            ranges.views = (ranges.views.0.min(v), ranges.views.1.max(v));
        }

        ranges
    }
}

pub struct PopularityEngine;

impl Default for PopularityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PopularityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score one destination against catalog-wide ranges.
    pub fn score(
        &self,
        stats: &DestinationStats,
        ranges: &SignalRanges,
        now: DateTime<Utc>,
    ) -> PopularityScore {
        let components = PopularityComponents {
            bookings: normalize_score(stats.bookings as f32, ranges.bookings.0, ranges.bookings.1),
            searches: normalize_score(stats.searches as f32, ranges.searches.0, ranges.searches.1),
            views: normalize_score(stats.views as f32, ranges.views.0, ranges.views.1),
            quality: wilson_quality(stats.average_rating, stats.review_count),
            trend: trend_score(stats.growth_rate),
            seasonality: stats.seasonality_boost.clamp(0.0, 1.0),
        };

        let weighted_sum = components.bookings * BOOKINGS_WEIGHT
            + components.searches * SEARCHES_WEIGHT
            + components.views * VIEWS_WEIGHT
            + components.quality * QUALITY_WEIGHT
            + components.trend * TREND_WEIGHT
            + components.seasonality * SEASONALITY_WEIGHT;

        let recency_decay = recency_decay(stats.last_booking_at, now);
        let score = (weighted_sum * recency_decay).clamp(0.0, 1.0);

        debug!(
            destination_id = %stats.destination_id,
            score,
            recency_decay,
            "Popularity score computed"
        );

        PopularityScore {
            destination_id: stats.destination_id.clone(),
            score,
            components,
            recency_decay,
            computed_at: now,
        }
    }

    /// Score the whole catalog in one pass, computing ranges first.
    pub fn score_catalog(
        &self,
        stats: &[DestinationStats],
        now: DateTime<Utc>,
    ) -> Vec<PopularityScore> {
        let ranges = SignalRanges::from_stats(stats);
        stats.iter().map(|s| self.score(s, &ranges, now)).collect()
    }
}

/// Wilson-score lower bound at 95% confidence over `rating / 5` as the
/// success proportion and the review count as sample size.
pub fn wilson_quality(average_rating: f32, review_count: u32) -> f32 {
    if review_count == 0 {
        return 0.0;
    }

    let n = review_count as f32;
    let p = (average_rating / 5.0).clamp(0.0, 1.0);
    let z = WILSON_Z;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = p + z2 / (2.0 * n);
    let margin = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();

    ((center - margin) / denominator).clamp(0.0, 1.0)
}

/// Piecewise growth-rate map: negative rates land in [0, 0.5), 0% at 0.5,
/// +100% at 0.75, +300% and above at 1.0.
pub fn trend_score(growth_rate: f32) -> f32 {
    if growth_rate < 0.0 {
        0.5 * (1.0 + growth_rate).clamp(0.0, 1.0)
    } else if growth_rate <= 1.0 {
        0.5 + 0.25 * growth_rate
    } else if growth_rate < 3.0 {
        0.75 + 0.25 * (growth_rate - 1.0) / 2.0
    } else {
        1.0
    }
}

fn recency_decay(last_booking: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f32 {
    match last_booking {
        Some(at) => {
            let age_days = (now - at).num_seconds().max(0) as f32 / 86_400.0;
            half_life_decay(age_days, RECENCY_HALF_LIFE_DAYS).max(RECENCY_DECAY_FLOOR)
        }
        None => RECENCY_DECAY_UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stats(id: &str, bookings: u64) -> DestinationStats {
        DestinationStats {
            destination_id: id.to_string(),
            bookings,
            searches: bookings * 10,
            views: bookings * 50,
            average_rating: 4.2,
            review_count: 120,
            growth_rate: 0.2,
            seasonality_boost: 0.5,
            last_booking_at: Some(Utc::now() - Duration::days(3)),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = BOOKINGS_WEIGHT
            + SEARCHES_WEIGHT
            + VIEWS_WEIGHT
            + QUALITY_WEIGHT
            + TREND_WEIGHT
            + SEASONALITY_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wilson_zero_reviews_is_zero() {
        assert_eq!(wilson_quality(5.0, 0), 0.0);
    }

    #[test]
    fn test_wilson_increases_with_review_count() {
        let few = wilson_quality(4.5, 5);
        let some = wilson_quality(4.5, 50);
        let many = wilson_quality(4.5, 500);
        assert!(few < some);
        assert!(some < many);
    }

    #[test]
    fn test_trend_map_fixed_points() {
        assert_eq!(trend_score(0.0), 0.5);
        assert!((trend_score(1.0) - 0.75).abs() < 1e-6);
        assert_eq!(trend_score(3.0), 1.0);
        assert_eq!(trend_score(10.0), 1.0);
        assert!(trend_score(-0.5) < 0.5);
        assert_eq!(trend_score(-2.0), 0.0);
    }

    #[test]
    fn test_score_always_in_unit_range() {
        let engine = PopularityEngine::new();
        let now = Utc::now();

        let extreme = DestinationStats {
            destination_id: "extreme".to_string(),
            bookings: u64::MAX / 2,
            searches: 0,
            views: u64::MAX / 2,
            average_rating: 5.0,
            review_count: u32::MAX,
            growth_rate: 1_000.0,
            seasonality_boost: 5.0,
            last_booking_at: Some(now),
        };

        let catalog = vec![extreme, stats("a", 10), stats("b", 0)];
        for score in engine.score_catalog(&catalog, now) {
            assert!((0.0..=1.0).contains(&score.score), "{:?}", score);
            assert!((0.0..=1.0).contains(&score.components.seasonality));
        }
    }

    #[test]
    fn test_recency_decay_half_life_and_floor() {
        let now = Utc::now();
        let half = recency_decay(Some(now - Duration::days(120)), now);
        assert!((half - 0.5).abs() < 0.01);

        // Very old bookings hit the floor.
        let old = recency_decay(Some(now - Duration::days(3650)), now);
        assert!((old - 0.3).abs() < 1e-6);

        // No last booking defaults to 0.5.
        assert_eq!(recency_decay(None, now), 0.5);
    }

    #[test]
    fn test_more_bookings_score_higher() {
        let engine = PopularityEngine::new();
        let now = Utc::now();
        let catalog = vec![stats("low", 5), stats("high", 500)];
        let scores = engine.score_catalog(&catalog, now);
        let low = scores.iter().find(|s| s.destination_id == "low").unwrap();
        let high = scores.iter().find(|s| s.destination_id == "high").unwrap();
        assert!(high.score > low.score);
    }
}
