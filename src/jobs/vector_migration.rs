// ============================================
// Vector Migration Job
// ============================================
//
// One-shot backfill for user vectors stored before segment enrichment
// existed. Re-enriches each affected user and overwrites the stored
// vector. Supports dry-run: everything is computed and reported but
// nothing is written.
//
// Usage:
//   recommendation-service --mode vector-migration
//   MIGRATION_DRY_RUN=true recommendation-service --mode vector-migration

use crate::services::enrichment::EnrichmentService;
use crate::services::storage::{SharedProfileSource, SharedVectorStore};
use std::collections::HashMap;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Report what would change without writing anything.
    pub dry_run: bool,
}

impl MigrationConfig {
    pub fn from_env() -> Self {
        Self {
            dry_run: std::env::var("MIGRATION_DRY_RUN")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct MigrationSummary {
    pub migrated: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
    /// How many users landed in each segment, keyed by segment name.
    pub segment_distribution: HashMap<String, u32>,
}

pub struct VectorMigrationJob {
    config: MigrationConfig,
    profiles: SharedProfileSource,
    vectors: SharedVectorStore,
    enrichment: EnrichmentService,
}

impl VectorMigrationJob {
    pub fn new(
        config: MigrationConfig,
        profiles: SharedProfileSource,
        vectors: SharedVectorStore,
        enrichment: EnrichmentService,
    ) -> Self {
        Self {
            config,
            profiles,
            vectors,
            enrichment,
        }
    }

    pub async fn run(&self) -> anyhow::Result<MigrationSummary> {
        let candidates = self.vectors.users_missing_segment().await?;
        info!(
            candidates = candidates.len(),
            dry_run = self.config.dry_run,
            "Starting vector migration"
        );

        let mut summary = MigrationSummary::default();

        for user_id in candidates {
            match self.migrate_user(user_id).await {
                Ok(Some(segment)) => {
                    summary.migrated += 1;
                    *summary.segment_distribution.entry(segment).or_insert(0) += 1;
                }
                Ok(None) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", user_id, e));
                    error!(user_id = %user_id, error = %e, "Migration failed for user");
                }
            }
        }

        info!(
            migrated = summary.migrated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Vector migration completed"
        );

        Ok(summary)
    }

    /// Returns the assigned segment name, or `None` when the user was
    /// skipped (no profile, or still no segment after re-enrichment).
    async fn migrate_user(&self, user_id: Uuid) -> anyhow::Result<Option<String>> {
        let profile = match self.profiles.fetch_profile(user_id).await? {
            Some(profile) => profile,
            None => {
                warn!(user_id = %user_id, "Skipping user without a profile");
                return Ok(None);
            }
        };

        let enriched = self.enrichment.build_vector(user_id, &profile);
        let segment = match enriched.primary_segment {
            Some(segment) => segment.as_str().to_string(),
            None => {
                warn!(user_id = %user_id, "Re-enrichment produced no segment, skipping");
                return Ok(None);
            }
        };

        if self.config.dry_run {
            info!(user_id = %user_id, segment = %segment, "Dry run, would migrate");
            return Ok(Some(segment));
        }

        self.vectors.save_vector(&enriched).await?;
        Ok(Some(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BudgetRange, EnrichedUserVector, FeatureVector, PreferenceProfile, VectorSource,
    };
    use crate::services::cache::CacheHandle;
    use crate::services::events::NoopEventPublisher;
    use crate::services::storage::{InMemoryProfileSource, InMemoryVectorStore, VectorStore};
    use chrono::Utc;
    use std::sync::Arc;

    fn legacy_vector(user_id: Uuid) -> EnrichedUserVector {
        EnrichedUserVector {
            user_id,
            vector: FeatureVector::neutral(),
            base_vector: None,
            segment_vector: None,
            preference_weight: 1.0,
            confidence: 0.3,
            primary_segment: None,
            source: VectorSource::PreferenceOnly,
            computed_at: Utc::now(),
        }
    }

    fn profile(user_id: Uuid) -> PreferenceProfile {
        PreferenceProfile {
            user_id,
            climate_preferences: Some(vec!["temperate".to_string()]),
            travel_types: Some(vec!["culture".to_string(), "history".to_string()]),
            budget_range: Some(BudgetRange {
                min: 500.0,
                max: 2500.0,
            }),
            activity_level: Some("moderate".to_string()),
            group_types: Some(vec!["couple".to_string()]),
            preferred_destinations: None,
            activity_interests: Some(vec!["museums".to_string()]),
            risk_tolerance: Some("moderate".to_string()),
            accommodation_types: Some(vec!["hotel".to_string()]),
            onboarding_completed: true,
        }
    }

    fn job(
        dry_run: bool,
        profiles: Arc<InMemoryProfileSource>,
        vectors: Arc<InMemoryVectorStore>,
    ) -> VectorMigrationJob {
        let enrichment = EnrichmentService::new(
            profiles.clone(),
            vectors.clone(),
            CacheHandle::noop(),
            Arc::new(NoopEventPublisher),
            &crate::config::EngineConfig::default(),
        );
        VectorMigrationJob::new(MigrationConfig { dry_run }, profiles, vectors, enrichment)
    }

    #[tokio::test]
    async fn test_migrates_users_missing_segment() {
        let profiles = Arc::new(InMemoryProfileSource::new());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let user_id = Uuid::new_v4();
        profiles.insert(user_id, profile(user_id));
        vectors.save_vector(&legacy_vector(user_id)).await.unwrap();

        let summary = job(false, profiles, vectors.clone()).run().await.unwrap();
        assert_eq!(summary.migrated, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.segment_distribution.values().sum::<u32>(), 1);

        let updated = vectors.get_vector(user_id).await.unwrap().unwrap();
        assert!(updated.primary_segment.is_some());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let profiles = Arc::new(InMemoryProfileSource::new());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let user_id = Uuid::new_v4();
        profiles.insert(user_id, profile(user_id));
        vectors.save_vector(&legacy_vector(user_id)).await.unwrap();

        let summary = job(true, profiles, vectors.clone()).run().await.unwrap();
        assert_eq!(summary.migrated, 1);

        let stored = vectors.get_vector(user_id).await.unwrap().unwrap();
        assert!(stored.primary_segment.is_none());
    }

    #[tokio::test]
    async fn test_user_without_profile_is_skipped() {
        let profiles = Arc::new(InMemoryProfileSource::new());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let user_id = Uuid::new_v4();
        vectors.save_vector(&legacy_vector(user_id)).await.unwrap();

        let summary = job(false, profiles, vectors).run().await.unwrap();
        assert_eq!(summary.migrated, 0);
        assert_eq!(summary.skipped, 1);
    }
}
