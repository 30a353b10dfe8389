// Utility functions for recommendation-service

/// Normalize a score to [0, 1] range
pub fn normalize_score(score: f32, min: f32, max: f32) -> f32 {
    if max - min < f32::EPSILON {
        0.5
    } else {
        ((score - min) / (max - min)).clamp(0.0, 1.0)
    }
}

/// Exponential decay with a half-life expressed in days.
pub fn half_life_decay(age_days: f32, half_life_days: f32) -> f32 {
    (-age_days / half_life_days * std::f32::consts::LN_2).exp()
}

/// Count how many entries of `values` contain any of the `keywords`
/// (case-insensitive substring match).
pub fn keyword_matches(values: &[String], keywords: &[&str]) -> usize {
    values
        .iter()
        .filter(|v| {
            let lower = v.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .count()
}
