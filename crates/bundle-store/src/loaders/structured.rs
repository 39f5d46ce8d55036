//! Structured `summary.json` + `timeseries.json` pair written by the bundle
//! builder.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use forecast_common::{BundleResult, RegionKey};

use super::{read_document, read_optional, union_avalanches, Document, FormatLoader, LoadOutcome};
use crate::layout::DataLayout;
use crate::locator::SourceKind;
use crate::raw::{
    parse_avalanches, parse_entries, parse_forecast, parse_summary, parse_tables, RawBundle,
    RawManifest,
};
use crate::store::DataStore;

pub struct StructuredLoader;

#[async_trait]
impl FormatLoader for StructuredLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::Structured
    }

    #[instrument(skip(self, store, layout), fields(region = %region))]
    async fn load(
        &self,
        store: &dyn DataStore,
        layout: &DataLayout,
        region: &RegionKey,
    ) -> BundleResult<LoadOutcome> {
        let summary = match read_document(store, &layout.structured_summary(region)).await? {
            Document::Parsed(Value::Object(obj)) => obj,
            Document::Parsed(_) => {
                return Ok(LoadOutcome::Malformed(
                    "summary document is not an object".to_string(),
                ))
            }
            Document::Malformed(reason) => return Ok(LoadOutcome::Malformed(reason)),
            Document::Absent => return Ok(LoadOutcome::Absent),
        };

        let doc = Value::Object(summary);

        // Nested manifest wins over top-level run fields.
        let top_level = RawManifest::from_value(&doc);
        let manifest = match doc.get("manifest").and_then(RawManifest::from_value) {
            Some(nested) => Some(nested.or(top_level.unwrap_or_default())),
            None => top_level,
        };

        let regional = match doc.get("avalanches") {
            Some(list) => parse_avalanches(Some(list)),
            None => {
                let file = read_optional(store, &layout.region_avalanches(region)).await?;
                parse_avalanches(file.as_ref())
            }
        };

        let mut raw = RawBundle {
            region: doc.get("region").and_then(Value::as_str).map(str::to_string),
            manifest,
            forecast: parse_forecast(doc.get("forecast")),
            summary: parse_summary(doc.get("summary")),
            avalanches: union_avalanches(store, layout, region, regional).await?,
            station_observations: parse_tables(doc.get("stations")),
            model_observations: parse_tables(doc.get("model")),
            ..Default::default()
        };

        match read_optional(store, &layout.structured_timeseries(region)).await? {
            Some(series) => {
                raw.station_timeseries = parse_entries(series.get("stations"));
                raw.model_timeseries = parse_entries(series.get("model"));
            }
            None => debug!("No usable timeseries document"),
        }

        Ok(LoadOutcome::Loaded(raw))
    }
}
