//! The normalized per-region bundle and its run manifest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::band::BandMap;
use crate::forecast::Forecast;
use crate::observation::AvalancheObservation;
use crate::region::RegionKey;
use crate::table::{Table, TimeseriesEntry};

/// Version label given to synthesized manifests.
pub const DEFAULT_VERSION: &str = "v0";

/// Map tile base used when no source names one.
pub const DEFAULT_TILES_BASE: &str = "https://tile.openstreetmap.org/";

/// URL prefix under which the data root is published to browsers.
pub const PUBLIC_DATA_PREFIX: &str = "/data/";

/// Locations of a run's published artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifacts {
    pub forecast: String,
    pub summary: String,
    pub tiles_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quicklook: Option<String>,
}

impl Artifacts {
    pub fn default_forecast(region: &RegionKey) -> String {
        format!("{}{}/forecast.json", PUBLIC_DATA_PREFIX, region)
    }

    pub fn default_summary(region: &RegionKey) -> String {
        format!("{}{}/forecast_summary.json", PUBLIC_DATA_PREFIX, region)
    }

    pub fn defaults_for(region: &RegionKey) -> Self {
        Self {
            forecast: Self::default_forecast(region),
            summary: Self::default_summary(region),
            tiles_base: DEFAULT_TILES_BASE.to_string(),
            stations: None,
            quicklook: None,
        }
    }
}

/// Metadata for the data-producing run behind a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub run_time: String,
    pub version: String,
    pub artifacts: Artifacts,
}

/// Everything the dashboard renders for one region.
///
/// Built by the resolver and shared read-only; band-keyed fields always carry
/// all three bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBundle {
    pub region: RegionKey,
    pub manifest: Manifest,
    pub forecast: Option<Forecast>,
    pub summary: Option<Map<String, Value>>,
    pub avalanches: Vec<AvalancheObservation>,
    pub station_observations: BandMap<Table>,
    pub model_observations: BandMap<Table>,
    pub station_timeseries: BandMap<TimeseriesEntry>,
    pub model_timeseries: BandMap<TimeseriesEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifacts() {
        let key = RegionKey::parse("Whistler").unwrap();
        let artifacts = Artifacts::defaults_for(&key);
        assert_eq!(artifacts.forecast, "/data/whistler/forecast.json");
        assert_eq!(artifacts.summary, "/data/whistler/forecast_summary.json");
        assert_eq!(artifacts.tiles_base, DEFAULT_TILES_BASE);

        let json = serde_json::to_value(&artifacts).unwrap();
        assert!(json.get("tilesBase").is_some());
        assert!(json.get("stations").is_none());
    }
}
