//! Application state for the dashboard API.

use std::sync::Arc;

use bundle_store::{
    BundleCache, BundleResolver, CountingStore, DataLayout, DataStore, LocalStore, RegionLister,
};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,

    /// Filesystem store shared by the resolver and lister; its counters feed
    /// the readiness report.
    pub store: Arc<CountingStore<LocalStore>>,

    pub resolver: BundleResolver,

    pub regions: RegionLister,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let store = Arc::new(CountingStore::new(LocalStore));
        let shared: Arc<dyn DataStore> = store.clone();
        let layout = DataLayout::new(&config.data_root);
        let cache = Arc::new(BundleCache::new(config.mode.cache_policy()));

        Self {
            resolver: BundleResolver::new(shared.clone(), layout.clone(), cache),
            regions: RegionLister::new(shared, layout),
            store,
            config,
        }
    }
}
