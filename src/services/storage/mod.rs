// ============================================
// Storage Boundaries
// ============================================
//
// Async trait seams for everything the engine reads and writes:
//
// - ProfileSource:      raw preference profiles (Ok(None) = user has no
//                       profile, Err = transient backend failure)
// - VectorStore:        enriched user vectors
// - DestinationCatalog: destination vectors, raw stats and computed
//                       popularity scores
//
// In-memory implementations back unit tests and local runs.

use crate::models::{
    DestinationStats, DestinationVector, EnrichedUserVector, PopularityScore, PreferenceProfile,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("profile backend unavailable: {0}")]
    ProfileBackend(String),
    #[error("vector store failure: {0}")]
    VectorStore(String),
    #[error("catalog failure: {0}")]
    Catalog(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Read access to raw preference profiles.
///
/// `Ok(None)` means the user genuinely has no profile; callers treat that
/// as cold-start. `Err` is a transient failure and triggers fallback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<PreferenceProfile>>;
}

/// Persistence for enriched user vectors.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn get_vector(&self, user_id: Uuid) -> Result<Option<EnrichedUserVector>>;

    async fn save_vector(&self, vector: &EnrichedUserVector) -> Result<()>;

    /// Users whose stored vector predates segment enrichment. Drives the
    /// migration job.
    async fn users_missing_segment(&self) -> Result<Vec<Uuid>>;
}

/// Destination-side reads plus popularity-score persistence.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn destination_vectors(&self) -> Result<Vec<DestinationVector>>;

    async fn destination_stats(&self) -> Result<Vec<DestinationStats>>;

    async fn popularity_scores(&self) -> Result<Vec<PopularityScore>>;

    async fn save_popularity_score(&self, score: &PopularityScore) -> Result<()>;

    /// The `limit` highest-scored destinations, descending.
    async fn top_popular(&self, limit: usize) -> Result<Vec<PopularityScore>> {
        let mut scores = self.popularity_scores().await?;
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scores.truncate(limit);
        Ok(scores)
    }
}

/// In-memory profile source for tests and local runs.
#[derive(Default)]
pub struct InMemoryProfileSource {
    profiles: DashMap<Uuid, PreferenceProfile>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: Uuid, profile: PreferenceProfile) {
        self.profiles.insert(user_id, profile);
    }
}

#[async_trait]
impl ProfileSource for InMemoryProfileSource {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<PreferenceProfile>> {
        Ok(self.profiles.get(&user_id).map(|p| p.clone()))
    }
}

/// Profile source that always fails. Exercises fallback paths in tests.
pub struct FailingProfileSource;

#[async_trait]
impl ProfileSource for FailingProfileSource {
    async fn fetch_profile(&self, _user_id: Uuid) -> Result<Option<PreferenceProfile>> {
        Err(StorageError::ProfileBackend("simulated outage".to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    vectors: DashMap<Uuid, EnrichedUserVector>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn get_vector(&self, user_id: Uuid) -> Result<Option<EnrichedUserVector>> {
        Ok(self.vectors.get(&user_id).map(|v| v.clone()))
    }

    async fn save_vector(&self, vector: &EnrichedUserVector) -> Result<()> {
        self.vectors.insert(vector.user_id, vector.clone());
        Ok(())
    }

    async fn users_missing_segment(&self) -> Result<Vec<Uuid>> {
        Ok(self
            .vectors
            .iter()
            .filter(|entry| entry.value().primary_segment.is_none())
            .map(|entry| *entry.key())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    vectors: DashMap<String, DestinationVector>,
    stats: DashMap<String, DestinationStats>,
    scores: DashMap<String, PopularityScore>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vector(&self, vector: DestinationVector) {
        self.vectors.insert(vector.destination_id.clone(), vector);
    }

    pub fn insert_stats(&self, stats: DestinationStats) {
        self.stats.insert(stats.destination_id.clone(), stats);
    }

    pub fn insert_score(&self, score: PopularityScore) {
        self.scores.insert(score.destination_id.clone(), score);
    }
}

#[async_trait]
impl DestinationCatalog for InMemoryCatalog {
    async fn destination_vectors(&self) -> Result<Vec<DestinationVector>> {
        Ok(self.vectors.iter().map(|e| e.value().clone()).collect())
    }

    async fn destination_stats(&self) -> Result<Vec<DestinationStats>> {
        Ok(self.stats.iter().map(|e| e.value().clone()).collect())
    }

    async fn popularity_scores(&self) -> Result<Vec<PopularityScore>> {
        Ok(self.scores.iter().map(|e| e.value().clone()).collect())
    }

    async fn save_popularity_score(&self, score: &PopularityScore) -> Result<()> {
        self.scores.insert(score.destination_id.clone(), score.clone());
        Ok(())
    }
}

/// Convenience aliases for handing stores to services.
pub type SharedProfileSource = Arc<dyn ProfileSource>;
pub type SharedVectorStore = Arc<dyn VectorStore>;
pub type SharedCatalog = Arc<dyn DestinationCatalog>;
