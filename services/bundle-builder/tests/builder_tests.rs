//! Generation runs against temporary inputs, read back through the resolver.

use clap::Parser;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use bundle_builder::{run, BuildArgs, BuilderError};
use bundle_store::{BundleCache, BundleResolver, CachePolicy, DataLayout, LocalStore};
use forecast_common::Axis;
use test_utils::{assert_close, assert_series_close};

const MODEL_CSV: &str = "\
region,elevation_band,valid_date,variable,level,mean_value,p95
Whistler,alpine,2024-01-15T00:00:00Z,TMP,500 mb,-21.5,-16
whistler,alpine,2024-01-15T06:00:00Z,TMP,500 mb,-20.25,-15
whistler,treeline,2024-01-15T06:00:00Z,TMP,500 mb,-12,-8
whistler,valley,2024-01-15T06:00:00Z,PRATE,Sfc,0.4,
South_Rockies,upper,2024-01-15T06:00:00Z,TMP,500 mb,-25,-19
";

const STATIONS_CSV: &str = "\
station_id,station_name,region,elevation_band,obs_time,temp_c,wind_mps,hs_cm
WHI1,Whistler Peak,whistler,alpine,2024-01-15T00:00:00Z,-9,12,205
WHI1,Whistler Peak,whistler,alpine,2024-01-15T06:00:00Z,-8,14,210
WHI3,Creekside,whistler,below_treeline,2024-01-15T06:00:00Z,1,2,40
";

struct Inputs {
    dir: tempfile::TempDir,
}

impl Inputs {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.csv"), MODEL_CSV).unwrap();
        std::fs::create_dir(dir.path().join("stations")).unwrap();
        std::fs::write(dir.path().join("stations/whistler.csv"), STATIONS_CSV).unwrap();
        Self { dir }
    }

    fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).display().to_string()
    }

    fn args(&self, extra: &[&str]) -> BuildArgs {
        let mut argv = vec![
            "bundle-builder".to_string(),
            "--model-csv".to_string(),
            self.path("model.csv"),
            "--station-csv".to_string(),
            self.path("stations"),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        BuildArgs::try_parse_from(argv).unwrap()
    }
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_single_region_documents() {
    let inputs = Inputs::new();
    let out = inputs.path("out");
    let written = run(&inputs.args(&["--region", "Whistler", "--output", &out])).unwrap();

    assert_eq!(written.len(), 2);
    let summary = read(&written[0]);
    assert_eq!(summary["region"], "whistler");
    assert_eq!(summary["tiles_base"], "https://tile.openstreetmap.org/");
    assert!(summary.get("quicklook_png").is_none());
    assert_eq!(summary["version"].as_str().unwrap().len(), 12);

    let alpine = &summary["model"]["above_treeline"][0];
    assert_eq!(alpine["columns"], serde_json::json!(["valid_date", "mean_value", "p95"]));
    assert_close!(alpine["rows"][0]["mean_value"].as_f64().unwrap(), -20.25);
    assert_eq!(alpine["metadata"]["variable"], "TMP");
    assert_eq!(summary["model"]["below_treeline"][0]["metadata"]["variable"], "PRATE");

    let stations = &summary["stations"]["above_treeline"][0];
    assert_eq!(stations["metadata"]["count"], 1);
    assert_eq!(stations["rows"][0]["hs_cm"], 210.0);

    let timeseries = read(&written[1]);
    assert_eq!(timeseries["stations"]["above_treeline"][0]["stationId"], "WHI1");
    assert_eq!(timeseries["model"]["treeline"][0]["label"], "TMP @ 500 mb");
}

#[test]
fn test_explicit_spec_and_quicklook() {
    let inputs = Inputs::new();
    let out = inputs.path("out");
    let written = run(&inputs.args(&[
        "--region",
        "whistler",
        "--output",
        &out,
        "--model-spec",
        "TMP@500 mb:p95",
        "--quicklook",
        "/data/whistler/quicklook.png",
    ]))
    .unwrap();

    let summary = read(&written[0]);
    assert_eq!(summary["quicklook_png"], "/data/whistler/quicklook.png");
    assert_eq!(summary["model"]["above_treeline"][0]["columns"], serde_json::json!(["valid_date", "p95"]));
    assert_eq!(summary["model"]["below_treeline"], serde_json::json!([]));
}

#[test]
fn test_discovers_all_regions() {
    let inputs = Inputs::new();
    let out = inputs.path("out");
    let written = run(&inputs.args(&["--output", &out])).unwrap();

    // whistler and south_rockies, two files each
    assert_eq!(written.len(), 4);
    let rockies = read(&Path::new(&out).join("south_rockies/summary.json"));
    assert_eq!(rockies["stations"]["above_treeline"], serde_json::json!([]));
    assert_eq!(rockies["model"]["above_treeline"][0]["rows"][0]["mean_value"], -25.0);
}

#[test]
fn test_multi_region_rejects_json_output() {
    let inputs = Inputs::new();
    let out = inputs.path("bundle.json");
    let err = run(&inputs.args(&["--output", &out])).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidArgument(_)));
}

#[test]
fn test_single_region_json_output_writes_beside() {
    let inputs = Inputs::new();
    let out = inputs.path("whistler.json");
    let written = run(&inputs.args(&["--region", "whistler", "--output", &out])).unwrap();
    assert!(written[0].ends_with("whistler/summary.json"));
}

#[test]
fn test_missing_station_rows_is_not_fatal() {
    let inputs = Inputs::new();
    let out = inputs.path("out");
    let written = run(&inputs.args(&["--region", "south_rockies", "--output", &out])).unwrap();

    let summary = read(&written[0]);
    assert_eq!(summary["stations"]["treeline"], serde_json::json!([]));
    assert_eq!(summary["model"]["above_treeline"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_model_region_is_fatal() {
    let inputs = Inputs::new();
    let err = run(&inputs.args(&["--region", "north_rockies", "--output", &inputs.path("out")]))
        .unwrap_err();
    assert!(matches!(err, BuilderError::NoRows(_)));
}

#[tokio::test]
async fn test_output_resolves_as_structured_bundle() {
    let inputs = Inputs::new();
    let out = inputs.path("out");
    run(&inputs.args(&["--region", "whistler", "--output", &out])).unwrap();

    let resolver = BundleResolver::new(
        Arc::new(LocalStore),
        DataLayout::new(&out),
        Arc::new(BundleCache::new(CachePolicy::Disabled)),
    );
    let bundle = resolver.resolve("whistler").await.unwrap();

    assert_eq!(bundle.manifest.artifacts.tiles_base, "https://tile.openstreetmap.org/");
    assert_eq!(bundle.model_observations.above_treeline.len(), 1);
    assert_eq!(bundle.station_observations.below_treeline[0].rows.len(), 1);

    let station = &bundle.station_timeseries.above_treeline[0];
    assert_eq!(station.label, "Whistler Peak");
    assert_eq!(station.series.len(), 3);
    assert_series_close(&station.series[0].values, &[Some(-9.0), Some(-8.0)]);

    let model = &bundle.model_timeseries.above_treeline[0];
    assert_eq!(model.series[1].y_axis, Some(Axis::Y2));
    assert_eq!(model.x.len(), 2);
}
