//! Time-bound response cache
//!
//! Responses are keyed by request URI and kept for a fixed lifetime. Nothing
//! is invalidated early. Expired entries are dropped when read, on every
//! insert, and by the periodic sweep started with [`ResponseCache::spawn_sweeper`].

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    value: Value,
}

/// In-memory JSON response cache
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    /// Cached value if still fresh; an expired entry is removed
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            let entry = entries.get(key)?;
            if self.is_fresh(entry) {
                debug!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            }
        }

        let mut entries = self.entries.write().await;
        // another request may have refreshed it meanwhile
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store a value, dropping every expired entry first
    pub async fn put(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Drop expired entries; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Purge expired entries every `period` until the task is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = interval(period);
            loop {
                tick.tick().await;
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
