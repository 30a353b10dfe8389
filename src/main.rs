use recommendation_service::jobs::{
    MigrationConfig, PopularityBatchConfig, PopularityBatchJob, VectorMigrationJob,
};
use recommendation_service::services::cache::{CacheHandle, RedisCache};
use recommendation_service::services::events::RedisEventPublisher;
use recommendation_service::services::storage::{
    InMemoryCatalog, InMemoryProfileSource, InMemoryVectorStore,
};
use recommendation_service::{Config, EnrichmentService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let mode = parse_mode();

    info!(
        service = %config.service.service_name,
        mode = %mode,
        "Starting recommendation service"
    );

    let redis_client =
        redis::Client::open(config.redis.url.clone()).expect("Failed to create Redis client");
    let cache = CacheHandle::new(Arc::new(RedisCache::new(redis_client.clone())));
    let events = Arc::new(RedisEventPublisher::new(redis_client));

    // Storage backends are bound at deployment time; the in-memory stores
    // keep standalone job runs self-contained.
    let profiles = Arc::new(InMemoryProfileSource::new());
    let vectors = Arc::new(InMemoryVectorStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());

    match mode.as_str() {
        "popularity-batch" => {
            let job = PopularityBatchJob::new(PopularityBatchConfig::from_env(), catalog);
            let stats = job.run().await.map_err(|e| {
                error!(error = %e, "Popularity batch job failed");
                e
            })?;
            info!(
                processed = stats.destinations_processed,
                succeeded = stats.destinations_succeeded,
                failed = stats.destinations_failed,
                "Popularity batch job completed"
            );
        }
        "vector-migration" => {
            let enrichment = EnrichmentService::new(
                profiles.clone(),
                vectors.clone(),
                cache,
                events,
                &config.engine,
            );
            let job = VectorMigrationJob::new(
                MigrationConfig::from_env(),
                profiles,
                vectors,
                enrichment,
            );
            let summary = job.run().await.map_err(|e| {
                error!(error = %e, "Vector migration failed");
                e
            })?;
            info!(
                migrated = summary.migrated,
                skipped = summary.skipped,
                failed = summary.failed,
                "Vector migration completed"
            );
        }
        other => {
            error!(mode = %other, "Unknown mode, expected popularity-batch or vector-migration");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn parse_mode() -> String {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--mode")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| std::env::var("SERVICE_MODE").ok())
        .unwrap_or_else(|| "popularity-batch".to_string())
}
