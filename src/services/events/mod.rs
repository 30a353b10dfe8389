// ============================================
// Event Sink
// ============================================
//
// Fire-and-forget enrichment events. Publishing is best-effort: a sink
// failure is logged and swallowed, never surfaced to the caller.

use crate::models::SegmentId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

const EVENT_STREAM_KEY: &str = "reco:events:enrichment";
const EVENT_STREAM_MAX_LEN: usize = 10_000;

/// Emitted after a user's vector has been enriched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentCompleted {
    pub user_id: Uuid,
    pub primary_segment: Option<SegmentId>,
    pub confidence: f32,
    /// Number of recommendations produced alongside the enrichment,
    /// 0 when enrichment ran standalone.
    pub recommendation_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &EnrichmentCompleted);
}

/// Publishes onto a capped Redis list; consumers drain it.
pub struct RedisEventPublisher {
    client: redis::Client,
}

impl RedisEventPublisher {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &EnrichmentCompleted) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(user_id = %event.user_id, error = %e, "Failed to serialize event");
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(user_id = %event.user_id, error = %e, "Event dropped, Redis unavailable");
                return;
            }
        };

        let result: std::result::Result<(), redis::RedisError> = redis::pipe()
            .lpush(EVENT_STREAM_KEY, payload)
            .ltrim(EVENT_STREAM_KEY, 0, (EVENT_STREAM_MAX_LEN - 1) as isize)
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            warn!(user_id = %event.user_id, error = %e, "Failed to publish enrichment event");
        }
    }
}

pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, _event: &EnrichmentCompleted) {}
}

/// Records events in memory so tests can assert on what was emitted.
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: std::sync::Mutex<Vec<EnrichmentCompleted>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<EnrichmentCompleted> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &EnrichmentCompleted) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_publisher_captures_events() {
        let publisher = RecordingEventPublisher::new();
        let event = EnrichmentCompleted {
            user_id: Uuid::new_v4(),
            primary_segment: Some(SegmentId::CulturalExplorer),
            confidence: 0.8,
            recommendation_count: 0,
            timestamp: Utc::now(),
        };
        publisher.publish(&event).await;

        let recorded = publisher.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].user_id, event.user_id);
    }
}
