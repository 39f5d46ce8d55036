//! Older single-file `bundle.json` regions.
//!
//! The flat schema has one timeseries block (or a list of them), one model
//! table and a flat list of weather-station rows. Each piece is placed in a
//! band by its band field and tagged with the `legacy` id.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use forecast_common::{BandMap, BundleResult, RegionKey, Row, Table, TimeseriesEntry};

use super::{read_document, union_avalanches, Document, FormatLoader, LoadOutcome};
use crate::csv_rows::REGION_COLUMN;
use crate::layout::DataLayout;
use crate::locator::SourceKind;
use crate::raw::{
    band_of, parse_avalanches, parse_forecast, parse_summary, tables_by_band, RawBundle,
    RawManifest,
};
use crate::store::DataStore;

/// Table id and fallback label given to remapped legacy data.
pub const LEGACY_ID: &str = "legacy";

pub struct LegacyBundleLoader;

#[async_trait]
impl FormatLoader for LegacyBundleLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::LegacyBundle
    }

    #[instrument(skip(self, store, layout), fields(region = %region))]
    async fn load(
        &self,
        store: &dyn DataStore,
        layout: &DataLayout,
        region: &RegionKey,
    ) -> BundleResult<LoadOutcome> {
        let doc = match read_document(store, &layout.legacy_bundle(region)).await? {
            Document::Parsed(doc @ Value::Object(_)) => doc,
            Document::Parsed(_) => {
                return Ok(LoadOutcome::Malformed(
                    "legacy bundle is not an object".to_string(),
                ))
            }
            Document::Malformed(reason) => return Ok(LoadOutcome::Malformed(reason)),
            Document::Absent => return Ok(LoadOutcome::Absent),
        };

        let top_level = RawManifest::from_value(&doc);
        let manifest = match doc.get("manifest").and_then(RawManifest::from_value) {
            Some(nested) => Some(nested.or(top_level.unwrap_or_default())),
            None => top_level,
        };

        let regional = parse_avalanches(doc.get("avalanches"));

        Ok(LoadOutcome::Loaded(RawBundle {
            region: doc.get("region").and_then(Value::as_str).map(str::to_string),
            manifest,
            forecast: parse_forecast(doc.get("forecast")),
            summary: parse_summary(doc.get("summary")),
            avalanches: union_avalanches(store, layout, region, regional).await?,
            station_observations: station_tables(doc.get("weather_station"), region),
            model_observations: model_tables(doc.get("model_table")),
            model_timeseries: timeseries_blocks(doc.get("timeseries")),
            ..Default::default()
        }))
    }
}

fn blocks(value: Option<&Value>) -> Vec<&Map<String, Value>> {
    match value {
        Some(Value::Object(obj)) => vec![obj],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

fn timeseries_blocks(value: Option<&Value>) -> BandMap<TimeseriesEntry> {
    let mut entries = BandMap::default();
    for block in blocks(value) {
        let mut entry: TimeseriesEntry = match serde_json::from_value(Value::Object(block.clone())) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable legacy timeseries block");
                continue;
            }
        };
        if entry.label.is_empty() {
            entry.label = LEGACY_ID.to_string();
        }
        entries.push(band_of(block), entry);
    }
    entries
}

fn model_tables(value: Option<&Value>) -> BandMap<Table> {
    let mut tables = BandMap::default();
    for block in blocks(value) {
        let table: Table = match serde_json::from_value(Value::Object(block.clone())) {
            Ok(table) => table,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable legacy model table");
                continue;
            }
        };
        let table = match table.id {
            Some(_) => table,
            None => table.with_id(LEGACY_ID),
        };
        tables.push(band_of(block), table);
    }
    tables
}

fn station_tables(value: Option<&Value>, region: &RegionKey) -> BandMap<Table> {
    let Some(Value::Array(items)) = value else {
        return BandMap::default();
    };

    let rows: Vec<Row> = items
        .iter()
        .filter_map(Value::as_object)
        .filter(|row| match row.get(REGION_COLUMN).and_then(Value::as_str) {
            Some(tag) => region.matches(tag),
            None => true,
        })
        .cloned()
        .collect();

    tables_by_band(&[], rows, LEGACY_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::ElevationBand;
    use serde_json::json;

    #[test]
    fn test_single_timeseries_block_goes_to_treeline() {
        let value = json!({"x": ["2024-01-15T00:00:00Z"], "series": [{"name": "TMP", "values": [1.0]}]});
        let entries = timeseries_blocks(Some(&value));
        assert_eq!(entries.treeline.len(), 1);
        assert_eq!(entries.treeline[0].label, "legacy");
    }

    #[test]
    fn test_timeseries_block_list_uses_band_field() {
        let value = json!([
            {"x": [], "series": [], "elevation_band": "alpine", "label": "TMP @ 500 mb"},
            {"x": [], "series": [], "elevation_band": "below_treeline"},
            "junk"
        ]);
        let entries = timeseries_blocks(Some(&value));
        assert_eq!(entries.get(ElevationBand::AboveTreeline)[0].label, "TMP @ 500 mb");
        assert_eq!(entries.below_treeline.len(), 1);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_station_rows_filtered_and_banded() {
        let key = RegionKey::parse("whistler").unwrap();
        let value = json!([
            {"station": "a", "region": "Whistler", "elevation": "upper"},
            {"station": "b", "region": "south_rockies"},
            {"station": "c"}
        ]);
        let tables = station_tables(Some(&value), &key);
        assert_eq!(tables.above_treeline[0].rows.len(), 1);
        assert_eq!(tables.treeline[0].rows.len(), 1);
        assert_eq!(tables.treeline[0].id.as_deref(), Some(LEGACY_ID));
    }

    #[test]
    fn test_model_table_keeps_columns() {
        let value = json!({"columns": ["time", "TMP"], "rows": [{"time": "t0", "TMP": -3.2}]});
        let tables = model_tables(Some(&value));
        assert_eq!(tables.treeline[0].columns, vec!["time", "TMP"]);
        assert_eq!(tables.treeline[0].id.as_deref(), Some(LEGACY_ID));
    }
}
