//! Keyed cache of scored feed tables.
//!
//! Entries are keyed by `(handle, limit)`. Only one fetch per key runs at a
//! time; callers arriving during a fetch wait and then read its result.
//! Failed fetches leave no entry behind. Expired entries are evicted
//! whenever a new table is stored, and per-key locks are dropped once no
//! caller holds them.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clients::FeedError;
use crate::domain::FeedTable;
use crate::observability::Metrics;

type CacheKey = (String, usize);

struct CachedTable {
    table: Arc<FeedTable>,
    loaded_at: Instant,
}

impl CachedTable {
    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.is_none_or(|ttl| self.loaded_at.elapsed() < ttl)
    }
}

pub struct FeedTableCache {
    ttl: Option<Duration>,
    entries: RwLock<FxHashMap<CacheKey, CachedTable>>,
    refresh_locks: Mutex<FxHashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for FeedTableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedTableCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl FeedTableCache {
    /// `ttl = None` keeps entries until they are invalidated.
    #[must_use]
    pub fn new(ttl: Option<Duration>, metrics: Arc<Metrics>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(FxHashMap::default()),
            refresh_locks: Mutex::new(FxHashMap::default()),
            metrics,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the cached table for `(handle, limit)` or runs `fetch` to
    /// produce one.
    ///
    /// # Errors
    /// Returns the error from `fetch`; nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        handle: &str,
        limit: usize,
        fetch: F,
    ) -> Result<Arc<FeedTable>, FeedError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FeedTable, FeedError>>,
    {
        let key: CacheKey = (handle.to_string(), limit);

        // Fast path
        if let Some(table) = self.fresh_entry(&key).await {
            self.metrics.cache_hits.inc();
            return Ok(table);
        }

        let refresh_lock = self.refresh_lock(&key);
        let result = self.fetch_locked(key, &refresh_lock, fetch).await;
        drop(refresh_lock);
        self.prune_refresh_locks();
        result
    }

    async fn fetch_locked<F, Fut>(
        &self,
        key: CacheKey,
        refresh_lock: &tokio::sync::Mutex<()>,
        fetch: F,
    ) -> Result<Arc<FeedTable>, FeedError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FeedTable, FeedError>>,
    {
        let _guard = refresh_lock.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(table) = self.fresh_entry(&key).await {
            self.metrics.cache_hits.inc();
            return Ok(table);
        }

        self.metrics.cache_misses.inc();
        debug!(handle = %key.0, limit = key.1, "feed table cache miss");
        let table = Arc::new(fetch().await?);

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "expired feed tables evicted");
        }
        entries.insert(
            key,
            CachedTable {
                table: Arc::clone(&table),
                loaded_at: Instant::now(),
            },
        );
        Ok(table)
    }

    /// Drops every entry for `handle`, whatever the limit.
    pub async fn invalidate(&self, handle: &str) {
        self.entries
            .write()
            .await
            .retain(|(cached_handle, _), _| cached_handle != handle);
        self.prune_refresh_locks();
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.prune_refresh_locks();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh_entry(&self, key: &CacheKey) -> Option<Arc<FeedTable>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.table))
    }

    fn refresh_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .refresh_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Drops refresh locks nobody holds. Locks are only cloned under the
    /// map's mutex, so a count of one cannot race with a new waiter.
    fn prune_refresh_locks(&self) {
        self.refresh_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    fn refresh_lock_count(&self) -> usize {
        self.refresh_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
