//! Decides which source formats to try for a region, and in what order.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use forecast_common::{BundleResult, RegionKey};

use crate::layout::DataLayout;
use crate::loaders::{DiscreteLoader, FormatLoader, LegacyBundleLoader, StructuredLoader};
use crate::store::DataStore;

/// On-disk representations of a region bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Structured,
    LegacyBundle,
    Discrete,
}

impl SourceKind {
    /// Probe order, highest priority first.
    pub const PRIORITY: [SourceKind; 3] = [
        SourceKind::Structured,
        SourceKind::LegacyBundle,
        SourceKind::Discrete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Structured => "structured",
            SourceKind::LegacyBundle => "legacy_bundle",
            SourceKind::Discrete => "discrete",
        }
    }

    pub fn loader(&self) -> &'static dyn FormatLoader {
        match self {
            SourceKind::Structured => &StructuredLoader,
            SourceKind::LegacyBundle => &LegacyBundleLoader,
            SourceKind::Discrete => &DiscreteLoader,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the load plan for `region`: every format whose required file exists,
/// in priority order. Discrete artifacts are always the last candidate.
pub async fn locate(
    store: &dyn DataStore,
    layout: &DataLayout,
    region: &RegionKey,
) -> BundleResult<Vec<SourceKind>> {
    let mut plan = Vec::with_capacity(SourceKind::PRIORITY.len());

    for kind in SourceKind::PRIORITY {
        let present = match kind {
            SourceKind::Structured => store.exists(&layout.structured_summary(region)).await?,
            SourceKind::LegacyBundle => store.exists(&layout.legacy_bundle(region)).await?,
            SourceKind::Discrete => true,
        };
        debug!(region = %region, source = %kind, present, "Probed source");
        if present {
            plan.push(kind);
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    #[tokio::test]
    async fn test_plan_for_empty_region_is_discrete_only() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let key = RegionKey::parse("whistler").unwrap();

        let plan = locate(&LocalStore, &layout, &key).await.unwrap();
        assert_eq!(plan, vec![SourceKind::Discrete]);
    }

    #[tokio::test]
    async fn test_plan_orders_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let region_dir = dir.path().join("whistler");
        std::fs::create_dir_all(&region_dir).unwrap();
        std::fs::write(region_dir.join("bundle.json"), "{}").unwrap();
        std::fs::write(region_dir.join("summary.json"), "{}").unwrap();

        let layout = DataLayout::new(dir.path());
        let key = RegionKey::parse("whistler").unwrap();
        let plan = locate(&LocalStore, &layout, &key).await.unwrap();
        assert_eq!(plan, SourceKind::PRIORITY.to_vec());
    }

    #[test]
    fn test_loader_kind_matches() {
        for kind in SourceKind::PRIORITY {
            assert_eq!(kind.loader().kind(), kind);
        }
    }
}
