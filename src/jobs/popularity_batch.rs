// ============================================
// Popularity Batch Job
// ============================================
//
// Background job that recomputes destination popularity scores from raw
// signals. Designed to run as a Kubernetes CronJob or standalone process.
//
// Workflow:
// 1. Fetch raw destination stats from the catalog
// 2. Derive normalization ranges over the whole snapshot
// 3. Score each destination and persist the result
//
// Usage:
//   recommendation-service --mode popularity-batch

use crate::services::popularity::{PopularityEngine, SignalRanges};
use crate::services::storage::SharedCatalog;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct PopularityBatchConfig {
    /// Destinations scored per batch before pausing.
    pub batch_size: usize,
    /// Delay between batches.
    pub batch_delay_ms: u64,
    /// Exit after one pass instead of looping.
    pub run_once: bool,
    /// Interval between full passes when looping.
    pub interval_secs: u64,
}

impl Default for PopularityBatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 200,
            batch_delay_ms: 100,
            run_once: true,
            interval_secs: 3600,
        }
    }
}

impl PopularityBatchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            batch_size: std::env::var("POPULARITY_BATCH_SIZE")
                .unwrap_or_else(|_| defaults.batch_size.to_string())
                .parse()
                .unwrap_or(defaults.batch_size),
            batch_delay_ms: std::env::var("POPULARITY_BATCH_DELAY_MS")
                .unwrap_or_else(|_| defaults.batch_delay_ms.to_string())
                .parse()
                .unwrap_or(defaults.batch_delay_ms),
            run_once: std::env::var("POPULARITY_RUN_ONCE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            interval_secs: std::env::var("POPULARITY_INTERVAL_SECS")
                .unwrap_or_else(|_| defaults.interval_secs.to_string())
                .parse()
                .unwrap_or(defaults.interval_secs),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopularityBatchStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub destinations_processed: u32,
    pub destinations_succeeded: u32,
    pub destinations_failed: u32,
    pub total_duration_ms: u64,
}

pub struct PopularityBatchJob {
    config: PopularityBatchConfig,
    catalog: SharedCatalog,
    engine: PopularityEngine,
}

impl PopularityBatchJob {
    pub fn new(config: PopularityBatchConfig, catalog: SharedCatalog) -> Self {
        Self {
            config,
            catalog,
            engine: PopularityEngine::new(),
        }
    }

    pub async fn run(&self) -> anyhow::Result<PopularityBatchStats> {
        loop {
            let stats = self.run_single_pass().await?;

            info!(
                processed = stats.destinations_processed,
                succeeded = stats.destinations_succeeded,
                failed = stats.destinations_failed,
                duration_ms = stats.total_duration_ms,
                "Popularity batch pass completed"
            );

            if self.config.run_once {
                return Ok(stats);
            }

            info!(
                interval_secs = self.config.interval_secs,
                "Sleeping until next pass"
            );
            sleep(Duration::from_secs(self.config.interval_secs)).await;
        }
    }

    async fn run_single_pass(&self) -> anyhow::Result<PopularityBatchStats> {
        let start_time = Instant::now();
        let mut stats = PopularityBatchStats {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        let snapshot = self.catalog.destination_stats().await?;
        info!(
            destinations = snapshot.len(),
            batch_size = self.config.batch_size,
            "Starting popularity batch pass"
        );

        // Ranges must come from the full snapshot so min-max normalization
        // is consistent across batches.
        let ranges = SignalRanges::from_stats(&snapshot);
        let now = Utc::now();

        for (batch_idx, batch) in snapshot.chunks(self.config.batch_size).enumerate() {
            info!(
                batch = batch_idx + 1,
                destinations = batch.len(),
                "Processing destination batch"
            );

            for destination in batch {
                stats.destinations_processed += 1;

                let score = self.engine.score(destination, &ranges, now);
                match self.catalog.save_popularity_score(&score).await {
                    Ok(()) => stats.destinations_succeeded += 1,
                    Err(e) => {
                        stats.destinations_failed += 1;
                        error!(
                            destination_id = %destination.destination_id,
                            error = %e,
                            "Failed to persist popularity score"
                        );
                    }
                }
            }

            if self.config.batch_delay_ms > 0 {
                sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        Ok(stats)
    }
}
