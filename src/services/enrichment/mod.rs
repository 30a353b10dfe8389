// ============================================
// Enrichment Service
// ============================================
//
// Turns a raw preference profile into a persisted enriched vector:
//
// 1. Vectorize preferences into the 8-axis feature vector
// 2. Classify the user against the segment catalog
// 3. Derive confidence from profile completeness
// 4. Blend the preference vector with the primary segment prototype
// 5. Persist, cache (best-effort) and emit an enrichment event

use crate::config::EngineConfig;
use crate::models::{EnrichedUserVector, PreferenceProfile, VectorSource};
use crate::services::cache::{self, CacheHandle};
use crate::services::events::{EnrichmentCompleted, EventPublisher};
use crate::services::segmentation::{SegmentBridge, SegmentClassifier};
use crate::services::storage::{SharedProfileSource, SharedVectorStore, StorageError};
use crate::services::vectorizer::Vectorizer;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const VECTOR_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("user {0} has no preference profile")]
    ProfileNotFound(Uuid),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;

pub struct EnrichmentService {
    profiles: SharedProfileSource,
    vectors: SharedVectorStore,
    cache: CacheHandle,
    events: Arc<dyn EventPublisher>,
    vectorizer: Vectorizer,
    classifier: SegmentClassifier,
    bridge: SegmentBridge,
}

impl EnrichmentService {
    pub fn new(
        profiles: SharedProfileSource,
        vectors: SharedVectorStore,
        cache: CacheHandle,
        events: Arc<dyn EventPublisher>,
        engine: &EngineConfig,
    ) -> Self {
        Self {
            profiles,
            vectors,
            cache,
            events,
            vectorizer: Vectorizer::new(),
            classifier: SegmentClassifier::new(engine.max_segments, engine.min_segment_score),
            bridge: SegmentBridge::new(),
        }
    }

    /// Fetch the user's profile, enrich and persist the result.
    pub async fn enrich_user(&self, user_id: Uuid) -> Result<EnrichedUserVector> {
        let profile = self
            .profiles
            .fetch_profile(user_id)
            .await?
            .ok_or(EnrichmentError::ProfileNotFound(user_id))?;

        let enriched = self.build_vector(user_id, &profile);
        self.vectors.save_vector(&enriched).await?;

        self.cache
            .set_json(&cache::vector_key(user_id), &enriched, VECTOR_CACHE_TTL_SECS)
            .await;

        self.events
            .publish(&EnrichmentCompleted {
                user_id,
                primary_segment: enriched.primary_segment,
                confidence: enriched.confidence,
                recommendation_count: 0,
                timestamp: Utc::now(),
            })
            .await;

        info!(
            user_id = %user_id,
            source = enriched.source.as_str(),
            segment = ?enriched.primary_segment.map(|s| s.as_str()),
            confidence = enriched.confidence,
            "Enriched user vector"
        );

        Ok(enriched)
    }

    /// Pure enrichment step, no persistence. Used by the migration job
    /// and by request-time enrichment of fresh profiles.
    pub fn build_vector(&self, user_id: Uuid, profile: &PreferenceProfile) -> EnrichedUserVector {
        let base = self.vectorizer.vectorize(profile);
        let assignments = self.classifier.classify(profile);
        let completeness = profile.completeness();
        let confidence = self
            .bridge
            .confidence(completeness, profile.has_critical_fields());

        let primary = assignments.first().cloned();
        debug!(
            user_id = %user_id,
            completeness = completeness,
            segments = assignments.len(),
            "Built enrichment inputs"
        );

        match primary {
            Some(assignment) if completeness > 0.0 => {
                let segment_vector = self.bridge.prototype_vector(assignment.segment);
                let (blended, preference_weight) =
                    self.bridge.blend(&base, assignment.segment, confidence);
                EnrichedUserVector {
                    user_id,
                    vector: blended,
                    base_vector: Some(base),
                    segment_vector: Some(segment_vector),
                    preference_weight,
                    confidence,
                    primary_segment: Some(assignment.segment),
                    source: VectorSource::Blended,
                    computed_at: Utc::now(),
                }
            }
            Some(assignment) => {
                // Empty profile that still classified (behavioral defaults):
                // nothing on the preference side is worth keeping.
                let segment_vector = self.bridge.prototype_vector(assignment.segment);
                EnrichedUserVector {
                    user_id,
                    vector: segment_vector,
                    base_vector: None,
                    segment_vector: Some(segment_vector),
                    preference_weight: 0.0,
                    confidence,
                    primary_segment: Some(assignment.segment),
                    source: VectorSource::SegmentOnly,
                    computed_at: Utc::now(),
                }
            }
            None => EnrichedUserVector {
                user_id,
                vector: base,
                base_vector: Some(base),
                segment_vector: None,
                preference_weight: 1.0,
                confidence,
                primary_segment: None,
                source: VectorSource::PreferenceOnly,
                computed_at: Utc::now(),
            },
        }
    }
}
