//! Separately published artifacts: manifest, forecast, summary, observation
//! lists and station CSV. Always loads, even from an empty directory.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use forecast_common::{Artifacts, BandMap, BundleResult, RegionKey, Table};

use super::{read_csv, read_optional, union_avalanches, FormatLoader, LoadOutcome};
use crate::csv_rows::{CsvRows, REGION_COLUMN};
use crate::layout::DataLayout;
use crate::locator::SourceKind;
use crate::raw::{parse_avalanches, parse_forecast, parse_summary, tables_by_band, RawBundle, RawManifest};
use crate::store::DataStore;

/// Table id for station rows read from CSV.
pub const STATIONS_TABLE_ID: &str = "weather_station";

pub struct DiscreteLoader;

#[async_trait]
impl FormatLoader for DiscreteLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::Discrete
    }

    #[instrument(skip(self, store, layout), fields(region = %region))]
    async fn load(
        &self,
        store: &dyn DataStore,
        layout: &DataLayout,
        region: &RegionKey,
    ) -> BundleResult<LoadOutcome> {
        let manifest = read_optional(store, &layout.manifest(region))
            .await?
            .and_then(|doc| RawManifest::from_value(&doc));
        if manifest.is_none() {
            debug!("No manifest, using default artifact locations");
        }
        let named = manifest.clone().unwrap_or_default();

        let forecast_locator = named
            .forecast
            .unwrap_or_else(|| Artifacts::default_forecast(region));
        let forecast_doc = read_artifact(store, layout, region, &forecast_locator).await?;

        let summary_locator = named
            .summary
            .unwrap_or_else(|| Artifacts::default_summary(region));
        let summary_doc = read_artifact(store, layout, region, &summary_locator).await?;

        let regional_doc = read_optional(store, &layout.region_avalanches(region)).await?;
        let regional = parse_avalanches(regional_doc.as_ref());

        Ok(LoadOutcome::Loaded(RawBundle {
            region: Some(region.to_string()),
            manifest,
            forecast: parse_forecast(forecast_doc.as_ref()),
            summary: parse_summary(summary_doc.as_ref()),
            avalanches: union_avalanches(store, layout, region, regional).await?,
            station_observations: station_tables(
                store,
                layout,
                region,
                named.stations.as_deref(),
            )
            .await?,
            ..Default::default()
        }))
    }
}

async fn read_artifact(
    store: &dyn DataStore,
    layout: &DataLayout,
    region: &RegionKey,
    locator: &str,
) -> BundleResult<Option<serde_json::Value>> {
    match layout.resolve_artifact(region, locator) {
        Some(path) => read_optional(store, &path).await,
        None => {
            debug!(locator = %locator, "Artifact locator does not resolve under the data root");
            Ok(None)
        }
    }
}

/// Station rows from the shared CSV when it has rows for `region`, otherwise
/// from the manifest-named or per-region CSV.
async fn station_tables(
    store: &dyn DataStore,
    layout: &DataLayout,
    region: &RegionKey,
    locator: Option<&str>,
) -> BundleResult<BandMap<Table>> {
    if let Some(mut shared) = read_csv(store, &layout.shared_stations()).await? {
        if shared.has_column(REGION_COLUMN) {
            shared.retain_region(region, false);
            if !shared.rows.is_empty() {
                return Ok(into_tables(shared));
            }
        } else {
            warn!(
                path = %layout.shared_stations().display(),
                "Shared station file has no region column"
            );
        }
    }

    let path = match locator {
        Some(locator) => match layout.resolve_artifact(region, locator) {
            Some(path) => path,
            None => {
                debug!(locator = %locator, "Station locator does not resolve under the data root");
                return Ok(BandMap::default());
            }
        },
        None => layout.region_stations(region),
    };

    match read_csv(store, &path).await? {
        Some(mut rows) => {
            rows.retain_region(region, true);
            Ok(into_tables(rows))
        }
        None => Ok(BandMap::default()),
    }
}

fn into_tables(csv: CsvRows) -> BandMap<Table> {
    let columns: Vec<String> = csv.headers.into_iter().filter(|h| !h.is_empty()).collect();
    tables_by_band(&columns, csv.rows, STATIONS_TABLE_ID)
}
