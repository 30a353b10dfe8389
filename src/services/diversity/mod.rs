use crate::models::ScoredDestination;

/// Diversity re-ranking with greedy MMR (Maximal Marginal Relevance).
///
/// factor = 0.0: pure relevance ranking
/// factor = 1.0: pure diversity
/// factor = 0.3: default balance
pub struct MmrDiversifier {
    factor: f32,
}

impl Default for MmrDiversifier {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl MmrDiversifier {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Re-rank candidates trading relevance against inter-item diversity.
    /// The single highest-relevance candidate is always selected first.
    /// No-op when the input is already at or below the target size.
    pub fn rerank(&self, items: Vec<ScoredDestination>, target: usize) -> Vec<ScoredDestination> {
        if items.len() <= target {
            return items;
        }

        let mut remaining = items;
        let mut selected: Vec<ScoredDestination> = Vec::with_capacity(target);

        // Seed with the most relevant candidate regardless of factor.
        let first_idx = index_of_max_by(&remaining, |item| item.score);
        selected.push(remaining.remove(first_idx));

        while selected.len() < target && !remaining.is_empty() {
            let best_idx = index_of_max_by(&remaining, |item| {
                let max_similarity = selected
                    .iter()
                    .map(|picked| item_similarity(item, picked))
                    .fold(0.0f32, f32::max);
                (1.0 - self.factor) * item.score + self.factor * (1.0 - max_similarity)
            });
            selected.push(remaining.remove(best_idx));
        }

        selected
    }
}

/// Coarse inter-item similarity heuristic: identical id 1.0, same
/// destination type 0.8, otherwise 0.2.
fn item_similarity(a: &ScoredDestination, b: &ScoredDestination) -> f32 {
    if a.destination_id == b.destination_id {
        1.0
    } else if a.destination_type == b.destination_type {
        0.8
    } else {
        0.2
    }
}

fn index_of_max_by<F>(items: &[ScoredDestination], key: F) -> usize
where
    F: Fn(&ScoredDestination) -> f32,
{
    let mut best_idx = 0;
    let mut best_value = f32::MIN;
    for (i, item) in items.iter().enumerate() {
        let value = key(item);
        if value > best_value {
            best_value = value;
            best_idx = i;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, destination_type: &str, score: f32) -> ScoredDestination {
        ScoredDestination {
            destination_id: id.to_string(),
            destination_type: destination_type.to_string(),
            score,
            reasons: Vec::new(),
        }
    }

    fn sample() -> Vec<ScoredDestination> {
        vec![
            item("beach-1", "beach", 0.9),
            item("beach-2", "beach", 0.85),
            item("beach-3", "beach", 0.8),
            item("city-1", "city", 0.75),
            item("mountain-1", "mountain", 0.7),
        ]
    }

    #[test]
    fn test_factor_zero_is_pure_relevance() {
        let diversifier = MmrDiversifier::new(0.0);
        let reranked = diversifier.rerank(sample(), 4);

        let ids: Vec<_> = reranked.iter().map(|i| i.destination_id.as_str()).collect();
        assert_eq!(ids, vec!["beach-1", "beach-2", "beach-3", "city-1"]);
    }

    #[test]
    fn test_highest_relevance_always_first() {
        for factor in [0.0, 0.3, 0.7, 1.0] {
            let diversifier = MmrDiversifier::new(factor);
            let reranked = diversifier.rerank(sample(), 3);
            assert_eq!(reranked[0].destination_id, "beach-1", "factor={factor}");
        }
    }

    #[test]
    fn test_diversity_prefers_other_types() {
        let diversifier = MmrDiversifier::new(0.7);
        let reranked = diversifier.rerank(sample(), 3);

        // With a strong diversity factor the second pick should leave the
        // beach cluster even though beach-2 has the higher raw score.
        assert_eq!(reranked[0].destination_id, "beach-1");
        assert_ne!(reranked[1].destination_type, "beach");
    }

    #[test]
    fn test_noop_at_or_below_target() {
        let diversifier = MmrDiversifier::default();
        let input = sample();
        let out = diversifier.rerank(input.clone(), 5);
        let ids: Vec<_> = out.iter().map(|i| i.destination_id.as_str()).collect();
        let expected: Vec<_> = input.iter().map(|i| i.destination_id.as_str()).collect();
        assert_eq!(ids, expected);

        let out = diversifier.rerank(sample(), 10);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_stops_when_candidates_exhausted() {
        let diversifier = MmrDiversifier::default();
        let out = diversifier.rerank(sample(), 4);
        assert_eq!(out.len(), 4);
    }
}
