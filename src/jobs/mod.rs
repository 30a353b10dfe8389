// ============================================
// Background Jobs Module
// ============================================
//
// Contains background job runners for:
// 1. Popularity score recomputation
// 2. Legacy user-vector migration
//
// These jobs can be triggered via:
// - CronJob (Kubernetes)
// - Command line argument (--mode popularity-batch | --mode vector-migration)

pub mod popularity_batch;
pub mod vector_migration;

pub use popularity_batch::{PopularityBatchConfig, PopularityBatchJob, PopularityBatchStats};
pub use vector_migration::{MigrationConfig, MigrationSummary, VectorMigrationJob};
