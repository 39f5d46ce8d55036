//! Partial bundle produced by a format loader, before normalization.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use forecast_common::{
    AvalancheObservation, BandMap, ElevationBand, Forecast, Row, Table, TimeseriesEntry,
};

/// Row fields that carry a band label in flat data, in lookup order.
const BAND_FIELDS: [&str; 3] = ["elevation_band", "band", "elevation"];

/// Loader output. Every field may be missing or partial; the normalizer fills
/// the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBundle {
    pub region: Option<String>,
    pub manifest: Option<RawManifest>,
    pub forecast: Option<Forecast>,
    pub summary: Option<Map<String, Value>>,
    pub avalanches: Vec<AvalancheObservation>,
    pub station_observations: BandMap<Table>,
    pub model_observations: BandMap<Table>,
    pub station_timeseries: BandMap<TimeseriesEntry>,
    pub model_timeseries: BandMap<TimeseriesEntry>,
}

/// Run metadata as found in a source document. Unset fields are defaulted
/// during normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawManifest {
    pub run_time: Option<String>,
    pub version: Option<String>,
    pub forecast: Option<String>,
    pub summary: Option<String>,
    pub tiles_base: Option<String>,
    pub stations: Option<String>,
    pub quicklook: Option<String>,
}

fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
}

impl RawManifest {
    /// Read run metadata from a manifest-shaped object.
    ///
    /// Accepts `run_time_utc`, `runTime` or `run_time` for the run time and
    /// snake or camel artifact keys. Top-level `tiles_base` and
    /// `quicklook_png` stand in when `artifacts` omits them.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let empty = Map::new();
        let artifacts = obj
            .get("artifacts")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let manifest = Self {
            run_time: first_str(obj, &["run_time_utc", "runTime", "run_time"]),
            version: first_str(obj, &["version"]),
            forecast: first_str(artifacts, &["forecast"]),
            summary: first_str(artifacts, &["summary"]),
            tiles_base: first_str(artifacts, &["tiles_base", "tilesBase", "tiles"])
                .or_else(|| first_str(obj, &["tiles_base", "tilesBase"])),
            stations: first_str(artifacts, &["stations", "weather_station"]),
            quicklook: first_str(artifacts, &["quicklook", "quicklook_png"])
                .or_else(|| first_str(obj, &["quicklook_png", "quicklook"])),
        };

        if manifest == Self::default() {
            None
        } else {
            Some(manifest)
        }
    }

    /// Field-wise merge preferring `self`.
    pub fn or(self, fallback: RawManifest) -> RawManifest {
        RawManifest {
            run_time: self.run_time.or(fallback.run_time),
            version: self.version.or(fallback.version),
            forecast: self.forecast.or(fallback.forecast),
            summary: self.summary.or(fallback.summary),
            tiles_base: self.tiles_base.or(fallback.tiles_base),
            stations: self.stations.or(fallback.stations),
            quicklook: self.quicklook.or(fallback.quicklook),
        }
    }
}

/// Parse an optional forecast document. An unreadable forecast is dropped.
pub fn parse_forecast(value: Option<&Value>) -> Option<Forecast> {
    let value = value.filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(forecast) => Some(forecast),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed forecast");
            None
        }
    }
}

/// Parse an optional narrative summary. A bare string becomes `{"text": ..}`.
pub fn parse_summary(value: Option<&Value>) -> Option<Map<String, Value>> {
    match value? {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) if !text.trim().is_empty() => {
            json!({ "text": text }).as_object().cloned()
        }
        _ => None,
    }
}

/// Parse an observation list given as an array or as `{"items": [..]}`.
///
/// Records that are not objects are skipped individually.
pub fn parse_avalanches(value: Option<&Value>) -> Vec<AvalancheObservation> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => match obj.get("items") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(obs) => Some(obs),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable avalanche record");
                None
            }
        })
        .collect()
}

pub fn parse_tables(value: Option<&Value>) -> BandMap<Table> {
    value
        .map(|v| BandMap::from_value(v, |item| serde_json::from_value(item.clone()).ok()))
        .unwrap_or_default()
}

pub fn parse_entries(value: Option<&Value>) -> BandMap<TimeseriesEntry> {
    value
        .map(|v| BandMap::from_value(v, |item| serde_json::from_value(item.clone()).ok()))
        .unwrap_or_default()
}

/// Band named by a flat object's band field; `treeline` when missing or
/// unrecognized.
pub fn band_of(obj: &Map<String, Value>) -> ElevationBand {
    BAND_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field).and_then(Value::as_str))
        .find_map(ElevationBand::parse)
        .unwrap_or(ElevationBand::Treeline)
}

/// Group flat rows into one table per band that has rows.
pub fn tables_by_band(columns: &[String], rows: Vec<Row>, id: &str) -> BandMap<Table> {
    let mut grouped: BandMap<Row> = BandMap::default();
    for row in rows {
        let band = band_of(&row);
        grouped.push(band, row);
    }

    let mut tables = BandMap::default();
    for band in ElevationBand::ALL {
        let rows = std::mem::take(grouped.get_mut(band));
        if rows.is_empty() {
            continue;
        }
        tables.push(band, Table::new(columns.to_vec(), rows).with_id(id));
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_key_variants() {
        let manifest = RawManifest::from_value(&json!({
            "runTime": "2024-01-15T12:00:00Z",
            "version": "202401151200",
            "tiles_base": "https://tiles.example.com/",
            "artifacts": {"forecast": "/data/whistler/forecast.json", "quicklook_png": "ql.png"}
        }))
        .unwrap();

        assert_eq!(manifest.run_time.as_deref(), Some("2024-01-15T12:00:00Z"));
        assert_eq!(manifest.tiles_base.as_deref(), Some("https://tiles.example.com/"));
        assert_eq!(manifest.quicklook.as_deref(), Some("ql.png"));
        assert!(manifest.summary.is_none());
    }

    #[test]
    fn test_manifest_ignores_non_string_fields() {
        assert!(RawManifest::from_value(&json!({"version": 3, "runTime": null})).is_none());
        assert!(RawManifest::from_value(&json!([])).is_none());
    }

    #[test]
    fn test_manifest_merge_prefers_self() {
        let primary = RawManifest {
            version: Some("v2".into()),
            ..Default::default()
        };
        let fallback = RawManifest {
            version: Some("v1".into()),
            run_time: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        let merged = primary.or(fallback);
        assert_eq!(merged.version.as_deref(), Some("v2"));
        assert!(merged.run_time.is_some());
    }

    #[test]
    fn test_parse_summary_wraps_text() {
        let summary = parse_summary(Some(&json!("Storm slabs at treeline"))).unwrap();
        assert_eq!(summary["text"], "Storm slabs at treeline");
        assert!(parse_summary(Some(&json!(42))).is_none());
    }

    #[test]
    fn test_parse_avalanches_shapes() {
        let wrapped = json!({"items": [{"region": "whistler"}, "junk", {"size": 2}]});
        assert_eq!(parse_avalanches(Some(&wrapped)).len(), 2);
        assert!(parse_avalanches(Some(&json!({"records": []}))).is_empty());
        assert!(parse_avalanches(None).is_empty());
    }

    #[test]
    fn test_tables_by_band_defaults_to_treeline() {
        let rows: Vec<Row> = vec![
            json!({"station": "a", "elevation_band": "Alpine"}),
            json!({"station": "b"}),
            json!({"station": "c", "band": "summit"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let tables = tables_by_band(&["station".to_string()], rows, "legacy");
        assert_eq!(tables.above_treeline.len(), 1);
        assert_eq!(tables.treeline[0].rows.len(), 2);
        assert_eq!(tables.treeline[0].id.as_deref(), Some("legacy"));
        assert!(tables.below_treeline.is_empty());
    }
}
