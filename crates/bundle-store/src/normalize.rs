//! Fill a raw loader output out to a complete [`RegionBundle`].

use forecast_common::bundle::{DEFAULT_TILES_BASE, DEFAULT_VERSION};
use forecast_common::time::now_iso;
use forecast_common::{Artifacts, BandMap, Manifest, RegionBundle, RegionKey, Table, TimeseriesEntry};

use crate::raw::{RawBundle, RawManifest};

/// Normalize `raw` as the bundle for `region`.
///
/// The requested key is authoritative over any region named in the source.
/// Missing run metadata is synthesized, table columns are completed from row
/// keys, and series are padded with nulls or truncated to the x axis length.
/// Normalizing an already normalized bundle changes nothing.
pub fn normalize(raw: RawBundle, region: &RegionKey) -> RegionBundle {
    let mut station_observations = raw.station_observations;
    let mut model_observations = raw.model_observations;
    let mut station_timeseries = raw.station_timeseries;
    let mut model_timeseries = raw.model_timeseries;

    complete_tables(&mut station_observations);
    complete_tables(&mut model_observations);
    complete_entries(&mut station_timeseries);
    complete_entries(&mut model_timeseries);

    RegionBundle {
        region: region.clone(),
        manifest: manifest(raw.manifest.unwrap_or_default(), region),
        forecast: raw.forecast,
        summary: raw.summary,
        avalanches: raw.avalanches,
        station_observations,
        model_observations,
        station_timeseries,
        model_timeseries,
    }
}

fn manifest(raw: RawManifest, region: &RegionKey) -> Manifest {
    Manifest {
        run_time: raw.run_time.unwrap_or_else(now_iso),
        version: raw.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        artifacts: Artifacts {
            forecast: raw
                .forecast
                .unwrap_or_else(|| Artifacts::default_forecast(region)),
            summary: raw
                .summary
                .unwrap_or_else(|| Artifacts::default_summary(region)),
            tiles_base: raw
                .tiles_base
                .unwrap_or_else(|| DEFAULT_TILES_BASE.to_string()),
            stations: raw.stations,
            quicklook: raw.quicklook,
        },
    }
}

fn complete_tables(tables: &mut BandMap<Table>) {
    tables.for_each_mut(Table::complete_columns);
}

fn complete_entries(entries: &mut BandMap<TimeseriesEntry>) {
    entries.for_each_mut(|entry| {
        if entry.label.trim().is_empty() {
            entry.label = entry.derived_label();
        }
        let len = entry.x.len();
        for series in &mut entry.series {
            series.values.resize(len, None);
        }
    });
}

impl From<RegionBundle> for RawBundle {
    fn from(bundle: RegionBundle) -> Self {
        let artifacts = bundle.manifest.artifacts;
        RawBundle {
            region: Some(bundle.region.to_string()),
            manifest: Some(RawManifest {
                run_time: Some(bundle.manifest.run_time),
                version: Some(bundle.manifest.version),
                forecast: Some(artifacts.forecast),
                summary: Some(artifacts.summary),
                tiles_base: Some(artifacts.tiles_base),
                stations: artifacts.stations,
                quicklook: artifacts.quicklook,
            }),
            forecast: bundle.forecast,
            summary: bundle.summary,
            avalanches: bundle.avalanches,
            station_observations: bundle.station_observations,
            model_observations: bundle.model_observations,
            station_timeseries: bundle.station_timeseries,
            model_timeseries: bundle.model_timeseries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::{ElevationBand, Row, Series};
    use serde_json::json;

    fn key() -> RegionKey {
        RegionKey::parse("whistler").unwrap()
    }

    fn sample_raw() -> RawBundle {
        let row: Row = json!({"station": "WHI", "temp_c": -4.5})
            .as_object()
            .cloned()
            .unwrap();
        let mut raw = RawBundle::default();
        raw.station_observations
            .push(ElevationBand::Treeline, Table::new(Vec::new(), vec![row]));
        raw.model_timeseries.push(
            ElevationBand::AboveTreeline,
            TimeseriesEntry {
                x: vec!["t0".into(), "t1".into(), "t2".into()],
                variable: Some("TMP".into()),
                level: Some("500 mb".into()),
                series: vec![
                    Series::new("TMP mean", vec![Some(1.0)]),
                    Series::new("TMP max", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
                ],
                ..Default::default()
            },
        );
        raw
    }

    #[test]
    fn test_empty_raw_gets_defaults() {
        let bundle = normalize(RawBundle::default(), &key());

        assert_eq!(bundle.region.as_str(), "whistler");
        assert_eq!(bundle.manifest.version, "v0");
        assert_eq!(bundle.manifest.artifacts.forecast, "/data/whistler/forecast.json");
        assert_eq!(bundle.manifest.artifacts.tiles_base, DEFAULT_TILES_BASE);
        assert!(bundle.forecast.is_none());
        assert!(bundle.station_observations.is_empty());
    }

    #[test]
    fn test_source_manifest_values_preferred() {
        let raw = RawBundle {
            manifest: Some(RawManifest {
                version: Some("202401151200".into()),
                tiles_base: Some("https://tiles.example.com/".into()),
                ..Default::default()
            }),
            region: Some("Somewhere Else".into()),
            ..Default::default()
        };
        let bundle = normalize(raw, &key());

        assert_eq!(bundle.region.as_str(), "whistler");
        assert_eq!(bundle.manifest.version, "202401151200");
        assert_eq!(bundle.manifest.artifacts.tiles_base, "https://tiles.example.com/");
        assert_eq!(bundle.manifest.artifacts.summary, "/data/whistler/forecast_summary.json");
    }

    #[test]
    fn test_columns_and_series_completed() {
        let bundle = normalize(sample_raw(), &key());

        assert_eq!(bundle.station_observations.treeline[0].columns, vec!["station", "temp_c"]);

        let entry = &bundle.model_timeseries.above_treeline[0];
        assert_eq!(entry.label, "TMP @ 500 mb");
        assert_eq!(entry.series[0].values, vec![Some(1.0), None, None]);
        assert_eq!(entry.series[1].values.len(), 3);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(sample_raw(), &key());
        let twice = normalize(RawBundle::from(once.clone()), &key());

        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }
}
