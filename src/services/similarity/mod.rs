// ============================================
// Similarity Scorer
// ============================================
//
// Vector similarity between a user vector and an item (destination) vector.
//
// Three metrics over equal-length vectors:
// - cosine: raw [-1, 1]; 0 when either magnitude is 0
// - euclidean: 1 - min(1, distance / sqrt(dimensions)), in [0, 1]
// - hybrid: 0.7 * cosine + 0.3 * euclidean
//
// Convention: `cosine_similarity` stays raw; every scoring consumer goes
// through `cosine_match`, which clamps negatives to 0 so merged scores are
// uniformly [0, 1].

use crate::models::{Axis, FeatureVector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, SimilarityError>;

/// Hybrid metric weights.
const COSINE_WEIGHT: f32 = 0.7;
const EUCLIDEAN_WEIGHT: f32 = 0.3;

/// Per-axis proximity thresholds for match explanations, tuned per semantic
/// meaning of the axis.
const AXIS_REASON_THRESHOLDS: [(Axis, f32, &str); 8] = [
    (Axis::Climate, 0.25, "climate_match"),
    (Axis::CultureVsNature, 0.25, "interest_match"),
    (Axis::Budget, 0.20, "budget_match"),
    (Axis::ActivityLevel, 0.25, "activity_match"),
    (Axis::Group, 0.30, "group_match"),
    (Axis::UrbanVsRural, 0.30, "setting_match"),
    (Axis::Gastronomy, 0.25, "gastronomy_match"),
    (Axis::PopularityAffinity, 0.30, "popularity_affinity_match"),
];

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Standard cosine similarity in [-1, 1]. Returns 0 when either vector has
/// zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (mag_a * mag_b))
}

/// Cosine clamped to [0, 1]; the uniform convention for score merging.
pub fn cosine_match(a: &[f32], b: &[f32]) -> Result<f32> {
    Ok(cosine_similarity(a, b)?.max(0.0))
}

/// Normalized inverse Euclidean distance in [0, 1].
pub fn euclidean_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    let distance: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt();

    let max_distance = (a.len() as f32).sqrt();
    Ok(1.0 - (distance / max_distance).min(1.0))
}

/// Fixed 70% cosine + 30% euclidean.
pub fn hybrid_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let cosine = cosine_similarity(a, b)?;
    let euclidean = euclidean_similarity(a, b)?;
    Ok(COSINE_WEIGHT * cosine + EUCLIDEAN_WEIGHT * euclidean)
}

/// Reason codes for axes where user and item are within the axis threshold.
/// Ordered by axis; no cap (unlike segment reasons).
pub fn explain_match(user: &FeatureVector, item: &FeatureVector) -> Vec<&'static str> {
    AXIS_REASON_THRESHOLDS
        .iter()
        .filter_map(|(axis, threshold, code)| {
            let diff = (user.get(*axis) - item.get(*axis)).abs();
            (diff < *threshold).then_some(*code)
        })
        .collect()
}

/// Confidence heuristic: `min(1, 0.7 * score + 0.3 * item_popularity)`.
pub fn match_confidence(score: f32, item_popularity: f32) -> f32 {
    (0.7 * score + 0.3 * item_popularity).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [0.5, 0.8, 0.3];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = [0.2, 0.9, 0.4, 0.7];
        let b = [0.8, 0.1, 0.6, 0.3];
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_cosine_zero_magnitude_guard() {
        let zero = [0.0, 0.0, 0.0];
        let v = [0.5, 0.5, 0.5];
        assert_eq!(cosine_similarity(&zero, &v).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_identity() {
        for v in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.3, 0.7, 0.2]] {
            assert!((euclidean_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hybrid_is_exact_weighted_sum() {
        let a = [0.1, 0.9, 0.5, 0.3];
        let b = [0.7, 0.2, 0.4, 0.8];
        let expected = 0.7 * cosine_similarity(&a, &b).unwrap()
            + 0.3 * euclidean_similarity(&a, &b).unwrap();
        assert_eq!(hybrid_similarity(&a, &b).unwrap(), expected);
    }

    #[test]
    fn test_dimension_mismatch_in_all_metrics() {
        let a = [0.5, 0.5];
        let b = [0.5, 0.5, 0.5];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(SimilarityError::DimensionMismatch { left: 2, right: 3 })
        ));
        assert!(matches!(
            euclidean_similarity(&a, &b),
            Err(SimilarityError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            hybrid_similarity(&a, &b),
            Err(SimilarityError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_cosine_match_clamps_negative() {
        let a = [1.0, -1.0];
        let b = [-1.0, 1.0];
        assert!(cosine_similarity(&a, &b).unwrap() < 0.0);
        assert_eq!(cosine_match(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_explain_match_emits_close_axes_in_order() {
        let user = FeatureVector::new([0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let item = FeatureVector::new([0.55, 0.5, 0.9, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let reasons = explain_match(&user, &item);
        assert!(reasons.contains(&"climate_match"));
        assert!(!reasons.contains(&"budget_match"));
        // Ordered by axis position
        assert_eq!(reasons[0], "climate_match");
    }

    #[test]
    fn test_match_confidence_capped() {
        assert!((match_confidence(0.5, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(match_confidence(1.5, 1.0), 1.0);
    }
}
