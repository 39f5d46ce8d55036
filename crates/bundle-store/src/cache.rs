//! Per-region bundle cache.
//!
//! With [`CachePolicy::Enabled`] the first successful resolution of a region
//! is kept for the life of the process. Concurrent requests for a region that
//! is still loading wait on the same load instead of starting their own.
//! Failed loads leave no entry behind.
//!
//! With [`CachePolicy::Disabled`] every request loads from disk.
//! [`BundleCache::load_uncached`] does the same under either policy, for
//! keys that must not take a slot.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use forecast_common::{BundleResult, RegionBundle, RegionKey};

/// Whether resolved bundles are reused across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    Enabled,
    Disabled,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Loads actually started; coalesced waiters do not add to this.
    pub loads: u64,
    pub entries: usize,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

type Slot = Arc<OnceCell<Arc<RegionBundle>>>;

pub struct BundleCache {
    policy: CachePolicy,
    entries: Mutex<HashMap<RegionKey, Slot>>,
    counters: Counters,
}

impl BundleCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the cached bundle for `key`, or run `load` to produce it.
    pub async fn get_or_load<F, Fut>(&self, key: &RegionKey, load: F) -> BundleResult<Arc<RegionBundle>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BundleResult<RegionBundle>>,
    {
        if self.policy == CachePolicy::Disabled {
            return self.load_uncached(load).await;
        }

        let slot = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.clone()).or_default().clone()
        };

        if let Some(bundle) = slot.get() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(bundle.clone());
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let bundle = slot
            .get_or_try_init(|| async {
                self.counters.loads.fetch_add(1, Ordering::Relaxed);
                load().await.map(Arc::new)
            })
            .await?;
        Ok(bundle.clone())
    }

    /// Run `load` without storing the result, counted as a miss.
    pub async fn load_uncached<F, Fut>(&self, load: F) -> BundleResult<Arc<RegionBundle>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BundleResult<RegionBundle>>,
    {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        load().await.map(Arc::new)
    }

    /// Number of regions with a resolved bundle.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }
}
