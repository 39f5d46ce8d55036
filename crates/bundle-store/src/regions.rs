//! Region enumeration.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use forecast_common::{slugify_region, BundleResult};

use crate::layout::{DataLayout, SHARED_DIR};
use crate::loaders::{read_document, Document};
use crate::store::DataStore;

/// Lists regions available under a data root.
#[derive(Clone)]
pub struct RegionLister {
    store: Arc<dyn DataStore>,
    layout: DataLayout,
}

impl RegionLister {
    pub fn new(store: Arc<dyn DataStore>, layout: DataLayout) -> Self {
        Self { store, layout }
    }

    /// Canonical region slugs in discovery order.
    ///
    /// `shared/regions.json` wins when it parses to a list; otherwise each
    /// non-hidden subdirectory of the root other than `shared` is a region.
    /// Never fails: storage errors are logged and yield an empty list.
    pub async fn list(&self) -> Vec<String> {
        match self.discover().await {
            Ok(names) => dedupe(names),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate regions");
                Vec::new()
            }
        }
    }

    async fn discover(&self) -> BundleResult<Vec<String>> {
        let path = self.layout.region_list();
        if let Document::Parsed(doc) = read_document(self.store.as_ref(), &path).await? {
            if let Some(names) = region_names(&doc) {
                return Ok(names);
            }
            warn!(path = %path.display(), "Region list has no usable entries");
        }

        debug!(root = %self.layout.root().display(), "Listing region directories");
        let dirs = self.store.list_dirs(self.layout.root()).await?;
        Ok(dirs
            .into_iter()
            .filter(|name| name != SHARED_DIR && !name.starts_with('.'))
            .collect())
    }
}

fn region_names(doc: &Value) -> Option<Vec<String>> {
    let list = match doc {
        Value::Array(list) => list,
        Value::Object(obj) => obj.get("regions")?.as_array()?,
        _ => return None,
    };
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| slugify_region(&name))
        .filter(|slug| !slug.is_empty() && seen.insert(slug.clone()))
        .collect()
}
