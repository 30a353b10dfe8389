use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub redis: RedisConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub cache_ttl_secs: u64,
}

/// Knobs for the scoring core. Defaults match the documented behavior;
/// overriding them is an operational escape hatch, not a product surface.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Weight of the popularity signal in hybrid merging.
    pub popularity_weight: f32,
    /// Weight of the vector-similarity signal in hybrid merging.
    pub similarity_weight: f32,
    /// Multiplier applied when a candidate matches the user's segment.
    pub segment_boost: f32,
    /// MMR diversity factor (0 = pure relevance).
    pub diversity_factor: f32,
    /// Maximum segments returned by the classifier.
    pub max_segments: usize,
    /// Minimum similarity for a segment assignment.
    pub min_segment_score: f32,
    /// Completeness above which preference-based scoring is used.
    pub preference_threshold: f32,
    /// Completeness above which segment-based scoring is used.
    pub segment_threshold: f32,
    /// Default number of recommendations per request.
    pub default_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            popularity_weight: 0.4,
            similarity_weight: 0.6,
            segment_boost: 1.2,
            diversity_factor: 0.3,
            max_segments: 3,
            min_segment_score: 0.3,
            preference_threshold: 0.7,
            segment_threshold: 0.4,
            default_limit: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = EngineConfig::default();

        Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "recommendation-service".to_string()),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                cache_ttl_secs: env::var("CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .expect("CACHE_TTL_SECS must be a valid u64"),
            },
            engine: EngineConfig {
                popularity_weight: parse_f32("POPULARITY_WEIGHT", defaults.popularity_weight),
                similarity_weight: parse_f32("SIMILARITY_WEIGHT", defaults.similarity_weight),
                segment_boost: parse_f32("SEGMENT_BOOST", defaults.segment_boost),
                diversity_factor: parse_f32("DIVERSITY_FACTOR", defaults.diversity_factor),
                max_segments: env::var("MAX_SEGMENTS")
                    .unwrap_or_else(|_| defaults.max_segments.to_string())
                    .parse()
                    .expect("MAX_SEGMENTS must be a valid usize"),
                min_segment_score: parse_f32("MIN_SEGMENT_SCORE", defaults.min_segment_score),
                preference_threshold: parse_f32(
                    "PREFERENCE_THRESHOLD",
                    defaults.preference_threshold,
                ),
                segment_threshold: parse_f32("SEGMENT_THRESHOLD", defaults.segment_threshold),
                default_limit: env::var("DEFAULT_LIMIT")
                    .unwrap_or_else(|_| defaults.default_limit.to_string())
                    .parse()
                    .expect("DEFAULT_LIMIT must be a valid usize"),
            },
        }
    }
}

fn parse_f32(key: &str, default: f32) -> f32 {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid f32", key)),
        Err(_) => default,
    }
}
