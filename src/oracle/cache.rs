//! Read-through snapshot cache
//!
//! Aggregation is idempotent and side-effect free, so the cache can be
//! dropped, bypassed or invalidated at any time without changing results.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::oracle::aggregator::RateAggregator;
use crate::types::Snapshot;

const SNAPSHOT_KEY: &str = "snapshot";

/// Storage side of the cache; expiry is the implementation's concern
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Live entry for `key`, if any
    async fn lookup(&self, key: &str) -> Option<Snapshot>;

    async fn store(&self, key: &str, snapshot: Snapshot, ttl: Duration);

    async fn invalidate(&self, key: &str);
}

/// Cached value for `key`, or the result of `compute` (which is then stored)
pub async fn get_or_compute<F>(
    cache: &dyn SnapshotCache,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Snapshot
where
    F: Future<Output = Snapshot>,
{
    if let Some(hit) = cache.lookup(key).await {
        tracing::debug!(key = %key, "Snapshot cache hit");
        return hit;
    }
    let snapshot = compute.await;
    cache.store(key, snapshot.clone(), ttl).await;
    snapshot
}

#[derive(Debug, Clone)]
struct Entry {
    snapshot: Snapshot,
    expires_at: Instant,
}

/// In-memory TTL cache
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for TtlCache {
    async fn lookup(&self, key: &str) -> Option<Snapshot> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| Instant::now() < e.expires_at)
            .map(|e| e.snapshot.clone())
    }

    async fn store(&self, key: &str, snapshot: Snapshot, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| Instant::now() < e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                snapshot,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// `get_snapshot()` for consumers (dashboard, report), optionally cached
pub struct SnapshotService {
    aggregator: RateAggregator,
    cache: Option<Arc<dyn SnapshotCache>>,
    ttl: Duration,
}

impl SnapshotService {
    pub fn new(aggregator: RateAggregator) -> Self {
        Self {
            aggregator,
            cache: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SnapshotCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    pub async fn get_snapshot(&self) -> Snapshot {
        match &self.cache {
            Some(cache) => {
                get_or_compute(
                    cache.as_ref(),
                    SNAPSHOT_KEY,
                    self.ttl,
                    self.aggregator.get_snapshot(),
                )
                .await
            }
            None => self.aggregator.get_snapshot().await,
        }
    }

    /// Skip the cache and replace its entry
    pub async fn refresh(&self) -> Snapshot {
        if let Some(cache) = &self.cache {
            cache.invalidate(SNAPSHOT_KEY).await;
        }
        self.get_snapshot().await
    }
}
