//! On-disk layout of the data root.
//!
//! ```text
//! <root>/shared/regions.json          optional region list
//! <root>/shared/avalanches.json       cross-region observations
//! <root>/shared/weather_station.csv   cross-region station rows
//! <root>/<region>/summary.json        structured summary
//! <root>/<region>/timeseries.json     structured timeseries
//! <root>/<region>/bundle.json         legacy bundle
//! <root>/<region>/manifest.json       discrete manifest
//! <root>/<region>/avalanches.json     per-region observations
//! <root>/<region>/weather_station.csv per-region station rows
//! ```

use std::path::{Component, Path, PathBuf};

use forecast_common::bundle::PUBLIC_DATA_PREFIX;
use forecast_common::RegionKey;

pub const SHARED_DIR: &str = "shared";
pub const STRUCTURED_SUMMARY_FILE: &str = "summary.json";
pub const STRUCTURED_TIMESERIES_FILE: &str = "timeseries.json";
pub const LEGACY_BUNDLE_FILE: &str = "bundle.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const AVALANCHES_FILE: &str = "avalanches.json";
pub const STATIONS_FILE: &str = "weather_station.csv";
pub const REGIONS_FILE: &str = "regions.json";

/// Path conventions for one data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shared_dir(&self) -> PathBuf {
        self.root.join(SHARED_DIR)
    }

    pub fn region_dir(&self, region: &RegionKey) -> PathBuf {
        self.root.join(region.as_str())
    }

    pub fn structured_summary(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(STRUCTURED_SUMMARY_FILE)
    }

    pub fn structured_timeseries(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(STRUCTURED_TIMESERIES_FILE)
    }

    pub fn legacy_bundle(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(LEGACY_BUNDLE_FILE)
    }

    pub fn manifest(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(MANIFEST_FILE)
    }

    pub fn region_avalanches(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(AVALANCHES_FILE)
    }

    pub fn region_stations(&self, region: &RegionKey) -> PathBuf {
        self.region_dir(region).join(STATIONS_FILE)
    }

    pub fn shared_avalanches(&self) -> PathBuf {
        self.shared_dir().join(AVALANCHES_FILE)
    }

    pub fn shared_stations(&self) -> PathBuf {
        self.shared_dir().join(STATIONS_FILE)
    }

    pub fn region_list(&self) -> PathBuf {
        self.shared_dir().join(REGIONS_FILE)
    }

    /// Map an artifact locator from a manifest to a path under the root.
    ///
    /// - `/data/<rest>` and other absolute locators resolve against the root
    /// - relative locators resolve against the region directory
    /// - remote URLs and locators that climb out with `..` resolve to `None`
    pub fn resolve_artifact(&self, region: &RegionKey, locator: &str) -> Option<PathBuf> {
        let locator = locator.trim();
        if locator.is_empty() || locator.contains("://") {
            return None;
        }

        let (base, rest) = if let Some(rest) = locator.strip_prefix(PUBLIC_DATA_PREFIX) {
            (self.root.clone(), rest)
        } else if let Some(rest) = locator.strip_prefix('/') {
            (self.root.clone(), rest)
        } else {
            (self.region_dir(region), locator)
        };

        let relative = Path::new(rest);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return None;
        }
        Some(base.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> (DataLayout, RegionKey) {
        (
            DataLayout::new("/srv/data"),
            RegionKey::parse("whistler").unwrap(),
        )
    }

    #[test]
    fn test_region_paths() {
        let (layout, key) = layout();
        assert_eq!(
            layout.structured_summary(&key),
            PathBuf::from("/srv/data/whistler/summary.json")
        );
        assert_eq!(
            layout.shared_stations(),
            PathBuf::from("/srv/data/shared/weather_station.csv")
        );
    }

    #[test]
    fn test_resolve_public_prefix() {
        let (layout, key) = layout();
        assert_eq!(
            layout.resolve_artifact(&key, "/data/whistler/forecast.json"),
            Some(PathBuf::from("/srv/data/whistler/forecast.json"))
        );
        assert_eq!(
            layout.resolve_artifact(&key, "/shared/forecast.json"),
            Some(PathBuf::from("/srv/data/shared/forecast.json"))
        );
    }

    #[test]
    fn test_resolve_relative_to_region() {
        let (layout, key) = layout();
        assert_eq!(
            layout.resolve_artifact(&key, "runs/2024/forecast.json"),
            Some(PathBuf::from("/srv/data/whistler/runs/2024/forecast.json"))
        );
    }

    #[test]
    fn test_resolve_rejects_remote_and_traversal() {
        let (layout, key) = layout();
        assert_eq!(layout.resolve_artifact(&key, "https://cdn.example.com/f.json"), None);
        assert_eq!(layout.resolve_artifact(&key, "../../etc/passwd"), None);
        assert_eq!(layout.resolve_artifact(&key, "/data/../secret.json"), None);
        assert_eq!(layout.resolve_artifact(&key, "  "), None);
    }
}
