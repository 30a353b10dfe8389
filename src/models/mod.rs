use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of axes in a [`FeatureVector`]. Fixed; axis order is part of the
/// storage contract and must never change without bumping the schema version.
pub const VECTOR_DIMENSIONS: usize = 8;

/// Schema version written alongside every persisted vector so that a future
/// axis change is detectable instead of silently misaligned.
pub const VECTOR_SCHEMA_VERSION: u32 = 1;

/// Semantically typed axes of a [`FeatureVector`], in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// 0 = cold, 1 = tropical
    Climate,
    /// 0 = nature, 1 = culture
    CultureVsNature,
    /// 0 = economy, 1 = luxury
    Budget,
    /// 0 = relax, 1 = adventure
    ActivityLevel,
    /// 0 = solo, 1 = family
    Group,
    /// 0 = rural, 1 = urban
    UrbanVsRural,
    /// 0 = basic, 1 = gourmet
    Gastronomy,
    /// 0 = off-beaten, 1 = mainstream
    PopularityAffinity,
}

impl Axis {
    pub const ALL: [Axis; VECTOR_DIMENSIONS] = [
        Axis::Climate,
        Axis::CultureVsNature,
        Axis::Budget,
        Axis::ActivityLevel,
        Axis::Group,
        Axis::UrbanVsRural,
        Axis::Gastronomy,
        Axis::PopularityAffinity,
    ];

    pub fn index(&self) -> usize {
        Axis::ALL.iter().position(|a| a == self).unwrap_or(0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Climate => "climate",
            Axis::CultureVsNature => "culture_vs_nature",
            Axis::Budget => "budget",
            Axis::ActivityLevel => "activity_level",
            Axis::Group => "group",
            Axis::UrbanVsRural => "urban_vs_rural",
            Axis::Gastronomy => "gastronomy",
            Axis::PopularityAffinity => "popularity_affinity",
        }
    }
}

/// Fixed-length preference vector. Every value is clamped to [0, 1] on
/// construction, so a stored vector is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; VECTOR_DIMENSIONS]);

impl FeatureVector {
    pub fn new(values: [f32; VECTOR_DIMENSIONS]) -> Self {
        Self(values.map(|v| v.clamp(0.0, 1.0)))
    }

    /// All axes at the neutral midpoint.
    pub fn neutral() -> Self {
        Self([0.5; VECTOR_DIMENSIONS])
    }

    pub fn get(&self, axis: Axis) -> f32 {
        self.0[axis.index()]
    }

    pub fn values(&self) -> &[f32; VECTOR_DIMENSIONS] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Per-axis weighted average: `weight_self` is the share attributed to
    /// `self`, the remainder to `other`.
    pub fn blend(&self, other: &FeatureVector, weight_self: f32) -> FeatureVector {
        let w = weight_self.clamp(0.0, 1.0);
        let mut out = [0.0; VECTOR_DIMENSIONS];
        for i in 0..VECTOR_DIMENSIONS {
            out[i] = w * self.0[i] + (1.0 - w) * other.0[i];
        }
        FeatureVector::new(out)
    }

    /// Linear interpolation toward `target` by `strength` in [0, 1].
    pub fn lerp_toward(&self, target: &FeatureVector, strength: f32) -> FeatureVector {
        let s = strength.clamp(0.0, 1.0);
        let mut out = [0.0; VECTOR_DIMENSIONS];
        for i in 0..VECTOR_DIMENSIONS {
            out[i] = self.0[i] + s * (target.0[i] - self.0[i]);
        }
        FeatureVector::new(out)
    }
}

#[derive(Debug, Error)]
pub enum VectorCodecError {
    #[error("unsupported vector schema version {found} (expected {expected})")]
    SchemaVersionMismatch { found: u32, expected: u32 },

    #[error("stored vector has {found} dimensions (expected {expected})")]
    DimensionMismatch { found: usize, expected: usize },
}

/// Versioned wire/storage form of a [`FeatureVector`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVector {
    pub schema_version: u32,
    pub values: Vec<f32>,
}

impl StoredVector {
    pub fn encode(vector: &FeatureVector) -> Self {
        Self {
            schema_version: VECTOR_SCHEMA_VERSION,
            values: vector.as_slice().to_vec(),
        }
    }

    pub fn decode(&self) -> Result<FeatureVector, VectorCodecError> {
        if self.schema_version != VECTOR_SCHEMA_VERSION {
            return Err(VectorCodecError::SchemaVersionMismatch {
                found: self.schema_version,
                expected: VECTOR_SCHEMA_VERSION,
            });
        }
        if self.values.len() != VECTOR_DIMENSIONS {
            return Err(VectorCodecError::DimensionMismatch {
                found: self.values.len(),
                expected: VECTOR_DIMENSIONS,
            });
        }
        let mut out = [0.0; VECTOR_DIMENSIONS];
        out.copy_from_slice(&self.values);
        Ok(FeatureVector::new(out))
    }
}

/// Behavioral traveler archetypes. Closed catalog; adding a variant requires
/// a matching entry in the segment catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentId {
    BudgetBackpacker,
    LuxuryTraveler,
    FamilyVacationer,
    AdventureSeeker,
    CulturalExplorer,
    BusinessTraveler,
    WellnessRelaxer,
    SocialNomad,
}

impl SegmentId {
    pub const ALL: [SegmentId; 8] = [
        SegmentId::BudgetBackpacker,
        SegmentId::LuxuryTraveler,
        SegmentId::FamilyVacationer,
        SegmentId::AdventureSeeker,
        SegmentId::CulturalExplorer,
        SegmentId::BusinessTraveler,
        SegmentId::WellnessRelaxer,
        SegmentId::SocialNomad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentId::BudgetBackpacker => "budget_backpacker",
            SegmentId::LuxuryTraveler => "luxury_traveler",
            SegmentId::FamilyVacationer => "family_vacationer",
            SegmentId::AdventureSeeker => "adventure_seeker",
            SegmentId::CulturalExplorer => "cultural_explorer",
            SegmentId::BusinessTraveler => "business_traveler",
            SegmentId::WellnessRelaxer => "wellness_relaxer",
            SegmentId::SocialNomad => "social_nomad",
        }
    }

    /// Position in [`SegmentId::ALL`]; the segment catalog is stored in the
    /// same order, which keeps catalog lookups total.
    pub fn index(&self) -> usize {
        SegmentId::ALL.iter().position(|id| id == self).unwrap_or(0)
    }

    /// Parse the storage representation. `None` indicates catalog/version
    /// skew and is surfaced as an UnknownSegment error by callers.
    pub fn parse_str(s: &str) -> Option<SegmentId> {
        SegmentId::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

/// Number of dimensions in a [`BehavioralProfile`].
pub const BEHAVIOR_DIMENSIONS: usize = 7;

/// 7-dimension behavioral summary used by the segment classifier.
/// Every dimension is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub budget: f32,
    pub group: f32,
    pub activity: f32,
    pub comfort: f32,
    /// Inferred from proxies (accommodation, activity level, travel types).
    /// A heuristic estimate, never ground truth.
    pub age: f32,
    pub style: f32,
    pub business_mix: f32,
}

impl BehavioralProfile {
    pub fn as_array(&self) -> [f32; BEHAVIOR_DIMENSIONS] {
        [
            self.budget,
            self.group,
            self.activity,
            self.comfort,
            self.age,
            self.style,
            self.business_mix,
        ]
    }
}

/// One entry of the static segment catalog. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentProfile {
    pub id: SegmentId,
    pub description: String,
    pub profile: BehavioralProfile,
    pub prototype: FeatureVector,
    pub preferred_destination_types: Vec<String>,
    pub example_destinations: Vec<String>,
}

/// Classifier output for a single segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAssignment {
    pub segment: SegmentId,
    /// Match score in [0, 1].
    pub score: f32,
    /// Human-readable reasons, capped at 4.
    pub reasons: Vec<String>,
    pub assigned_at: DateTime<Utc>,
}

/// How the final user vector was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorSource {
    SegmentOnly,
    PreferenceOnly,
    Blended,
}

impl VectorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorSource::SegmentOnly => "segment_only",
            VectorSource::PreferenceOnly => "preference_only",
            VectorSource::Blended => "blended",
        }
    }
}

/// Final blended user vector. Recomputed (superseded, not mutated) whenever
/// the underlying preference profile changes meaningfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedUserVector {
    pub user_id: Uuid,
    pub vector: FeatureVector,
    pub base_vector: Option<FeatureVector>,
    pub segment_vector: Option<FeatureVector>,
    /// Share of the blend attributed to preferences, in [0, 1].
    pub preference_weight: f32,
    pub confidence: f32,
    pub primary_segment: Option<SegmentId>,
    pub source: VectorSource,
    pub computed_at: DateTime<Utc>,
}

/// Normalized [0, 1] sub-scores of a popularity computation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PopularityComponents {
    pub bookings: f32,
    pub searches: f32,
    pub views: f32,
    pub quality: f32,
    pub trend: f32,
    pub seasonality: f32,
}

/// Catalog-wide batch output of the popularity engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityScore {
    pub destination_id: String,
    pub score: f32,
    pub components: PopularityComponents,
    pub recency_decay: f32,
    pub computed_at: DateTime<Utc>,
}

/// Request-scoped aggregate driving strategy selection. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ColdStartContext {
    pub segment: Option<SegmentAssignment>,
    pub enriched: Option<EnrichedUserVector>,
    /// Data-completeness fraction in [0, 1].
    pub completeness: f32,
    pub first_time: bool,
    pub onboarding_completed: bool,
}

/// Per-sub-weight breakdown of a contextual adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContextualBreakdown {
    pub weather_match: f32,
    pub seasonal_fit: f32,
    pub travel_season: f32,
    pub outdoor_boost: f32,
}

/// Non-destructive contextual adjustment of a base score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualScore {
    pub original: f32,
    /// Product of the four sub-weights, clamped to [0.7, 1.3].
    pub multiplier: f32,
    /// `min(1, original * multiplier)`.
    pub final_score: f32,
    pub breakdown: ContextualBreakdown,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationStrategy {
    PopularityOnly,
    HybridSegment,
    HybridPreferences,
}

impl RecommendationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStrategy::PopularityOnly => "popularity_only",
            RecommendationStrategy::HybridSegment => "hybrid_segment",
            RecommendationStrategy::HybridPreferences => "hybrid_preferences",
        }
    }
}

/// One scored candidate destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDestination {
    pub destination_id: String,
    pub destination_type: String,
    pub score: f32,
    pub reasons: Vec<String>,
}

/// Orchestrator output. `failed` is set only when even popularity data was
/// unavailable; every other degradation produces a usable list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub items: Vec<ScoredDestination>,
    pub strategy: RecommendationStrategy,
    pub confidence: f32,
    /// Hard fallback was taken after an upstream failure.
    pub fallback: bool,
    pub failed: bool,
    pub generated_at: DateTime<Utc>,
}

/// Raw user preference profile. Every sub-object is optional; callers must
/// handle absence explicitly instead of default-coalescing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub user_id: Uuid,
    pub climate_preferences: Option<Vec<String>>,
    pub travel_types: Option<Vec<String>>,
    pub budget_range: Option<BudgetRange>,
    pub activity_level: Option<String>,
    pub group_types: Option<Vec<String>>,
    pub preferred_destinations: Option<Vec<String>>,
    pub activity_interests: Option<Vec<String>>,
    pub risk_tolerance: Option<String>,
    pub accommodation_types: Option<Vec<String>>,
    pub onboarding_completed: bool,
}

impl PreferenceProfile {
    fn present(list: &Option<Vec<String>>) -> bool {
        list.as_ref().map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Fraction of the nine optional sub-objects that carry data.
    pub fn completeness(&self) -> f32 {
        let filled = [
            Self::present(&self.climate_preferences),
            Self::present(&self.travel_types),
            self.budget_range.is_some(),
            self.activity_level.is_some(),
            Self::present(&self.group_types),
            Self::present(&self.preferred_destinations),
            Self::present(&self.activity_interests),
            self.risk_tolerance.is_some(),
            Self::present(&self.accommodation_types),
        ]
        .iter()
        .filter(|&&p| p)
        .count();

        filled as f32 / 9.0
    }

    /// Budget range, travel types, group types and activity level all set.
    pub fn has_critical_fields(&self) -> bool {
        self.budget_range.is_some()
            && Self::present(&self.travel_types)
            && Self::present(&self.group_types)
            && self.activity_level.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f32,
    pub max: f32,
}

/// Catalog entry: a destination with its precomputed feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationVector {
    pub destination_id: String,
    pub name: String,
    pub destination_type: String,
    pub vector: FeatureVector,
}

/// Raw popularity signals for one destination, as collected by the batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationStats {
    pub destination_id: String,
    pub bookings: u64,
    pub searches: u64,
    pub views: u64,
    /// Average rating on a 0..=5 scale.
    pub average_rating: f32,
    pub review_count: u32,
    /// Booking growth rate as a fraction: 1.0 means +100%.
    pub growth_rate: f32,
    /// Externally supplied seasonal boost in [0, 1].
    pub seasonality_boost: f32,
    pub last_booking_at: Option<DateTime<Utc>>,
}
