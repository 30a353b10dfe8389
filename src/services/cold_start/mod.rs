// ============================================
// Cold-Start Orchestrator
// ============================================
//
// Strategy selection and scoring for users with little or no history:
//
// 1. Assemble a request context (stored vector, profile, completeness)
// 2. Pick a strategy:
//      completeness > 0.7 and enriched vector  -> HybridPreferences
//      completeness > 0.4 and segment known    -> HybridSegment
//      otherwise                               -> PopularityOnly
// 3. Score candidates, boost segment-preferred destination types
// 4. MMR-diversify down to the requested limit
//
// Degradation is hierarchical: a missing prerequisite drops to the next
// strategy down, an upstream failure drops straight to popularity with
// `fallback` set. Only an empty popularity table produces `failed`.

use crate::config::EngineConfig;
use crate::models::{
    ColdStartContext, DestinationVector, EnrichedUserVector, FeatureVector, PopularityScore,
    RecommendationResponse, RecommendationStrategy, ScoredDestination, SegmentId,
};
use crate::services::cache::{self, CacheHandle};
use crate::services::contextual::{ContextualWeightingEngine, TravelContext};
use crate::services::diversity::MmrDiversifier;
use crate::services::enrichment::EnrichmentService;
use crate::services::events::{EnrichmentCompleted, EventPublisher};
use crate::services::segmentation::catalog::profile_for;
use crate::services::similarity;
use crate::services::storage::{SharedCatalog, SharedProfileSource, SharedVectorStore};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const POPULAR_REASON: &str = "Popular destination";
// Hybrid strategies score a wider candidate pool, then MMR trims it.
const CANDIDATE_MULTIPLIER: usize = 3;

pub struct ColdStartOrchestrator {
    profiles: SharedProfileSource,
    vectors: SharedVectorStore,
    catalog: SharedCatalog,
    cache: CacheHandle,
    events: Arc<dyn EventPublisher>,
    enrichment: EnrichmentService,
    diversifier: MmrDiversifier,
    contextual: ContextualWeightingEngine,
    config: EngineConfig,
    cache_ttl_secs: u64,
}

impl ColdStartOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profiles: SharedProfileSource,
        vectors: SharedVectorStore,
        catalog: SharedCatalog,
        cache: CacheHandle,
        events: Arc<dyn EventPublisher>,
        enrichment: EnrichmentService,
        config: EngineConfig,
        cache_ttl_secs: u64,
    ) -> Self {
        let diversifier = MmrDiversifier::new(config.diversity_factor);
        Self {
            profiles,
            vectors,
            catalog,
            cache,
            events,
            enrichment,
            diversifier,
            contextual: ContextualWeightingEngine::new(),
            config,
            cache_ttl_secs,
        }
    }

    pub async fn recommend(&self, user_id: uuid::Uuid, limit: usize) -> RecommendationResponse {
        self.recommend_inner(user_id, limit, None).await
    }

    /// Same pipeline with contextual weather/season multipliers applied to
    /// each candidate's merged score before diversification.
    pub async fn recommend_in_context(
        &self,
        user_id: uuid::Uuid,
        limit: usize,
        context: &TravelContext,
    ) -> RecommendationResponse {
        self.recommend_inner(user_id, limit, Some(context)).await
    }

    async fn recommend_inner(
        &self,
        user_id: uuid::Uuid,
        limit: usize,
        travel_context: Option<&TravelContext>,
    ) -> RecommendationResponse {
        let limit = if limit == 0 {
            self.config.default_limit
        } else {
            limit
        };

        // Contextual responses are weather-dependent, only plain requests
        // are cached.
        let cache_key = cache::recommendation_key(user_id, limit);
        if travel_context.is_none() {
            if let Some(cached) = self.cache.get_json::<RecommendationResponse>(&cache_key).await {
                debug!(user_id = %user_id, "Serving cached recommendations");
                return cached;
            }
        }

        let (context, fallback) = match self.build_context(user_id).await {
            Ok(context) => (context, false),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Context build failed, hard fallback");
                (ColdStartContext::default(), true)
            }
        };

        let strategy = if fallback {
            RecommendationStrategy::PopularityOnly
        } else {
            self.select_strategy(&context)
        };

        let response = self
            .score_with_degradation(&context, strategy, limit, travel_context, fallback)
            .await;

        info!(
            user_id = %user_id,
            strategy = response.strategy.as_str(),
            items = response.items.len(),
            fallback = response.fallback,
            failed = response.failed,
            "Recommendations generated"
        );

        if context.first_time && !response.failed {
            if let Some(enriched) = &context.enriched {
                self.events
                    .publish(&EnrichmentCompleted {
                        user_id,
                        primary_segment: enriched.primary_segment,
                        confidence: enriched.confidence,
                        recommendation_count: response.items.len(),
                        timestamp: Utc::now(),
                    })
                    .await;
            }
        }

        if travel_context.is_none() && !response.failed && !response.fallback {
            self.cache
                .set_json(&cache_key, &response, self.cache_ttl_secs)
                .await;
        }

        response
    }

    /// Gather everything strategy selection needs. A transient storage
    /// failure surfaces as an error; a genuinely absent profile does not.
    async fn build_context(
        &self,
        user_id: uuid::Uuid,
    ) -> crate::services::storage::Result<ColdStartContext> {
        let stored = self.vectors.get_vector(user_id).await?;
        let profile = self.profiles.fetch_profile(user_id).await?;

        let first_time = stored.is_none();
        let completeness = profile.as_ref().map(|p| p.completeness()).unwrap_or(0.0);
        let onboarding_completed = profile
            .as_ref()
            .map(|p| p.onboarding_completed)
            .unwrap_or(false);

        // A fresh profile with no stored vector gets enriched inline so the
        // first request already benefits from segment blending.
        let enriched = match (stored, &profile) {
            (Some(existing), _) => Some(existing),
            (None, Some(profile)) => {
                let built = self.enrichment.build_vector(user_id, profile);
                if let Err(e) = self.vectors.save_vector(&built).await {
                    warn!(user_id = %user_id, error = %e, "Could not persist first-time vector");
                }
                Some(built)
            }
            (None, None) => None,
        };

        let segment = enriched.as_ref().and_then(assignment_from_vector);

        Ok(ColdStartContext {
            segment,
            enriched,
            completeness,
            first_time,
            onboarding_completed,
        })
    }

    fn select_strategy(&self, context: &ColdStartContext) -> RecommendationStrategy {
        if context.completeness > self.config.preference_threshold && context.enriched.is_some() {
            RecommendationStrategy::HybridPreferences
        } else if context.completeness > self.config.segment_threshold && context.segment.is_some()
        {
            RecommendationStrategy::HybridSegment
        } else {
            RecommendationStrategy::PopularityOnly
        }
    }

    async fn score_with_degradation(
        &self,
        context: &ColdStartContext,
        strategy: RecommendationStrategy,
        limit: usize,
        travel_context: Option<&TravelContext>,
        fallback: bool,
    ) -> RecommendationResponse {
        if strategy != RecommendationStrategy::PopularityOnly {
            match self.score_hybrid(context, strategy, limit, travel_context).await {
                Ok(Some(mut response)) => {
                    response.fallback = fallback;
                    return response;
                }
                Ok(None) => {
                    debug!("No candidate vectors, degrading to popularity");
                }
                Err(e) => {
                    warn!(error = %e, "Hybrid scoring failed, degrading to popularity");
                    return self.score_popularity(context, limit, travel_context, true).await;
                }
            }
        }

        self.score_popularity(context, limit, travel_context, fallback)
            .await
    }

    /// Returns `Ok(None)` when the catalog has no vectors, which degrades
    /// to popularity instead of failing.
    async fn score_hybrid(
        &self,
        context: &ColdStartContext,
        strategy: RecommendationStrategy,
        limit: usize,
        travel_context: Option<&TravelContext>,
    ) -> crate::services::storage::Result<Option<RecommendationResponse>> {
        let enriched = match &context.enriched {
            Some(enriched) => enriched,
            None => return Ok(None),
        };

        let candidates = self.catalog.destination_vectors().await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let popularity = self.popularity_by_id().await?;
        let segment = context.segment.as_ref().map(|a| a.segment);

        let mut scored: Vec<ScoredDestination> = candidates
            .iter()
            .map(|candidate| {
                self.score_candidate(enriched, candidate, &popularity, segment, travel_context)
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit * CANDIDATE_MULTIPLIER);
        let items = self.diversifier.rerank(scored, limit);

        Ok(Some(RecommendationResponse {
            items,
            strategy,
            confidence: strategy_confidence(strategy),
            fallback: false,
            failed: false,
            generated_at: Utc::now(),
        }))
    }

    fn score_candidate(
        &self,
        enriched: &EnrichedUserVector,
        candidate: &DestinationVector,
        popularity: &HashMap<String, f32>,
        segment: Option<SegmentId>,
        travel_context: Option<&TravelContext>,
    ) -> ScoredDestination {
        let pop = popularity
            .get(&candidate.destination_id)
            .copied()
            .unwrap_or(0.0);
        let sim = similarity::cosine_match(enriched.vector.as_slice(), candidate.vector.as_slice())
            .unwrap_or(0.0);

        let mut score =
            self.config.popularity_weight * pop + self.config.similarity_weight * sim;

        let mut reasons: Vec<String> = similarity::explain_match(&enriched.vector, &candidate.vector)
            .into_iter()
            .map(String::from)
            .collect();

        if let Some(segment) = segment {
            if segment_prefers(segment, &candidate.destination_type) {
                score *= self.config.segment_boost;
                reasons.push(format!("Matches your {} style", segment.as_str()));
            }
        }

        if pop >= 0.7 {
            reasons.push(POPULAR_REASON.to_string());
        }

        let mut score = score.min(1.0);
        if let Some(ctx) = travel_context {
            score = self.contextual.apply(score, &enriched.vector, ctx).final_score;
        }

        ScoredDestination {
            destination_id: candidate.destination_id.clone(),
            destination_type: candidate.destination_type.clone(),
            score,
            reasons,
        }
    }

    async fn score_popularity(
        &self,
        context: &ColdStartContext,
        limit: usize,
        travel_context: Option<&TravelContext>,
        fallback: bool,
    ) -> RecommendationResponse {
        let top = match self.catalog.top_popular(limit * CANDIDATE_MULTIPLIER).await {
            Ok(top) => top,
            Err(e) => {
                warn!(error = %e, "Popularity lookup failed");
                Vec::new()
            }
        };

        if top.is_empty() {
            return RecommendationResponse {
                items: Vec::new(),
                strategy: RecommendationStrategy::PopularityOnly,
                confidence: 0.0,
                fallback,
                failed: true,
                generated_at: Utc::now(),
            };
        }

        let types = self.destination_types().await;
        let user_vector = context
            .enriched
            .as_ref()
            .map(|e| e.vector)
            .unwrap_or_else(FeatureVector::neutral);

        let mut items: Vec<ScoredDestination> = top
            .iter()
            .map(|entry| {
                let mut score = entry.score;
                if let Some(ctx) = travel_context {
                    score = self.contextual.apply(score, &user_vector, ctx).final_score;
                }
                ScoredDestination {
                    destination_id: entry.destination_id.clone(),
                    destination_type: types
                        .get(&entry.destination_id)
                        .cloned()
                        .unwrap_or_default(),
                    score,
                    reasons: vec![POPULAR_REASON.to_string()],
                }
            })
            .collect();

        items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let items = self.diversifier.rerank(items, limit);

        RecommendationResponse {
            items,
            strategy: RecommendationStrategy::PopularityOnly,
            confidence: strategy_confidence(RecommendationStrategy::PopularityOnly),
            fallback,
            failed: false,
            generated_at: Utc::now(),
        }
    }

    async fn popularity_by_id(&self) -> crate::services::storage::Result<HashMap<String, f32>> {
        Ok(self
            .catalog
            .popularity_scores()
            .await?
            .into_iter()
            .map(|s: PopularityScore| (s.destination_id, s.score))
            .collect())
    }

    async fn destination_types(&self) -> HashMap<String, String> {
        match self.catalog.destination_vectors().await {
            Ok(vectors) => vectors
                .into_iter()
                .map(|v| (v.destination_id, v.destination_type))
                .collect(),
            Err(_) => HashMap::new(),
        }
    }
}

fn strategy_confidence(strategy: RecommendationStrategy) -> f32 {
    match strategy {
        RecommendationStrategy::HybridPreferences => 0.85,
        RecommendationStrategy::HybridSegment => 0.75,
        RecommendationStrategy::PopularityOnly => 0.6,
    }
}

fn segment_prefers(segment: SegmentId, destination_type: &str) -> bool {
    profile_for(segment)
        .preferred_destination_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(destination_type))
}

fn assignment_from_vector(
    enriched: &EnrichedUserVector,
) -> Option<crate::models::SegmentAssignment> {
    enriched
        .primary_segment
        .map(|segment| crate::models::SegmentAssignment {
            segment,
            score: enriched.confidence,
            reasons: Vec::new(),
            assigned_at: enriched.computed_at,
        })
}
