// ============================================
// Best-Effort Cache
// ============================================
//
// JSON cache seam for recommendation responses and enriched vectors.
// Cache failures never fail a request: every Redis error is logged at
// warn level and swallowed, a miss and a broken cache are
// indistinguishable to callers.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Option<String>;

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64);
}

/// Typed helpers over the raw string seam.
pub struct CacheHandle {
    inner: std::sync::Arc<dyn ResponseCache>,
}

impl CacheHandle {
    pub fn new(inner: std::sync::Arc<dyn ResponseCache>) -> Self {
        Self { inner }
    }

    pub fn noop() -> Self {
        Self::new(std::sync::Arc::new(NoopCache))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.inner.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.inner.set_raw(key, raw, ttl_secs).await,
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize cache value"),
        }
    }
}

/// Redis-backed cache. All errors are logged and swallowed.
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read skipped, Redis unavailable");
                return None;
            }
        };

        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache write skipped, Redis unavailable");
                return;
            }
        };

        if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

/// No-op cache for tests and cache-less deployments.
pub struct NoopCache;

#[async_trait]
impl ResponseCache for NoopCache {
    async fn get_raw(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl_secs: u64) {}
}

/// In-memory cache for unit tests; ignores TTLs.
#[derive(Default)]
pub struct InMemoryCache {
    entries: dashmap::DashMap<String, String>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    async fn set_raw(&self, key: &str, value: String, _ttl_secs: u64) {
        self.entries.insert(key.to_string(), value);
    }
}

pub fn recommendation_key(user_id: uuid::Uuid, limit: usize) -> String {
    format!("reco:user:{}:limit:{}", user_id, limit)
}

pub fn vector_key(user_id: uuid::Uuid) -> String {
    format!("reco:vector:{}", user_id)
}
