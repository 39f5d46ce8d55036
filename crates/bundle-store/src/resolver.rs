//! Region bundle resolution: cache lookup, then the locator's plan.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use forecast_common::{BundleError, BundleResult, RegionBundle, RegionKey};

use crate::cache::BundleCache;
use crate::layout::DataLayout;
use crate::loaders::LoadOutcome;
use crate::locator::locate;
use crate::normalize::normalize;
use crate::store::DataStore;

/// Resolves region keys to normalized bundles.
#[derive(Clone)]
pub struct BundleResolver {
    store: Arc<dyn DataStore>,
    layout: DataLayout,
    cache: Arc<BundleCache>,
}

impl BundleResolver {
    pub fn new(store: Arc<dyn DataStore>, layout: DataLayout, cache: Arc<BundleCache>) -> Self {
        Self {
            store,
            layout,
            cache,
        }
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Resolve `region` to its bundle.
    ///
    /// Fails only for an invalid region key or a storage failure other than a
    /// missing file. A region with no files at all resolves to a default
    /// bundle. Only regions with a directory under the data root are cached,
    /// so arbitrary keys cannot grow the cache.
    #[instrument(skip(self))]
    pub async fn resolve(&self, region: &str) -> BundleResult<Arc<RegionBundle>> {
        let key = RegionKey::parse(region)?;
        if !self.store.is_dir(&self.layout.region_dir(&key)).await? {
            debug!(region = %key, "No region directory, resolving without caching");
            return self.cache.load_uncached(|| self.load(&key)).await;
        }
        self.cache.get_or_load(&key, || self.load(&key)).await
    }

    async fn load(&self, key: &RegionKey) -> BundleResult<RegionBundle> {
        let store = self.store.as_ref();
        let plan = locate(store, &self.layout, key).await?;

        for kind in plan {
            match kind.loader().load(store, &self.layout, key).await? {
                LoadOutcome::Loaded(raw) => {
                    debug!(region = %key, source = %kind, "Loaded region bundle");
                    return Ok(normalize(raw, key));
                }
                LoadOutcome::Absent => {
                    debug!(region = %key, source = %kind, "Source absent, falling through");
                }
                LoadOutcome::Malformed(reason) => {
                    warn!(region = %key, source = %kind, reason = %reason, "Source malformed, falling through");
                }
            }
        }

        // The discrete loader always loads, so an exhausted plan is a bug.
        Err(BundleError::Internal(format!(
            "no source produced a bundle for region '{}'",
            key
        )))
    }
}
