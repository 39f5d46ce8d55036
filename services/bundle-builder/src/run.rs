//! End-to-end generation for one or more regions.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use forecast_common::slugify_region;
use forecast_common::time::{format_iso, version_stamp};

use crate::args::BuildArgs;
use crate::error::{BuilderError, BuilderResult};
use crate::model::{self, ModelSpec};
use crate::output::{
    check_output, region_dir, write_json, SummaryDocument, TimeseriesDocument, SUMMARY_FILE,
    TIMESERIES_FILE,
};
use crate::station;
use crate::Payload;

/// Regions to build, plus the regions known to have station data.
///
/// An explicit region skips discovery; its station set is empty so station
/// loading is always attempted.
pub fn discover_regions(args: &BuildArgs) -> BuilderResult<(Vec<String>, Vec<String>)> {
    if let Some(region) = &args.region {
        return Ok((vec![slugify_region(region.trim())], Vec::new()));
    }

    for path in &args.model_csv {
        if !path.exists() {
            return Err(BuilderError::FileNotFound(path.clone()));
        }
    }
    let model_regions = model::model_regions(&args.model_csv, &args.model_region_column)?;
    let station_regions = station::station_regions(&args.station_csv, &args.station_region_column)?;

    let missing: Vec<&String> = model_regions
        .iter()
        .filter(|r| !station_regions.contains(r))
        .collect();
    if !missing.is_empty() {
        warn!(regions = ?missing, "Regions missing station data");
    }
    Ok((model_regions, station_regions))
}

/// Generate both documents for every region. Returns the written paths.
pub fn run(args: &BuildArgs) -> BuilderResult<Vec<PathBuf>> {
    let range = args.date_range()?;
    let station_metrics = args.station_metric_list();
    let model_cols = args.model_columns();
    let station_cols = args.station_columns();

    let (regions, station_regions) = discover_regions(args)?;
    info!(?regions, "Regions to process");

    let output = args.output.as_deref();
    check_output(output, regions.len())?;
    let multi_region = regions.len() > 1;
    let total = regions.len();

    let mut generated = Vec::new();
    for (index, region) in regions.iter().enumerate() {
        let step = format!("{}/{}", index + 1, total);
        info!(%step, region = %region, "Processing region");

        let model_data = model::load_model(&args.model_csv, region, &model_cols, &range)?;
        info!(%step, region = %region, rows = model_data.rows.len(), "Loaded model data");

        let station_payload = if !station_regions.is_empty() && !station_regions.contains(region) {
            info!(%step, region = %region, "No station CSVs for region; using model data only");
            Payload::default()
        } else {
            match station::load_stations(&args.station_csv, region, &station_cols, &range) {
                Ok(data) => {
                    info!(%step, region = %region, rows = data.rows.len(), "Loaded station data");
                    station::build_payload(&data, &station_metrics, &station_cols)
                }
                Err(e) if e.is_data_gap() => {
                    warn!(%step, region = %region, error = %e, "Station data unavailable");
                    Payload::default()
                }
                Err(e) => return Err(e),
            }
        };

        let specs: Vec<ModelSpec> = if args.model_spec.is_empty() {
            model::discover_specs(&model_data)
        } else {
            args.model_spec.clone()
        };
        let model_payload = if specs.is_empty() {
            warn!(region = %region, "No model metrics discovered; skipping model summary and timeseries");
            Payload::default()
        } else {
            info!(%step, region = %region, specs = specs.len(), "Using model specs");
            model::build_payload(&model_data, &specs)
        };

        let dir = region_dir(output, region, multi_region);
        info!(%step, dir = %dir.display(), "Writing outputs");
        generated.extend(write_region(
            &dir,
            region,
            args,
            station_payload,
            model_payload,
        )?);
    }

    info!(count = generated.len(), "Completed generation of bundle outputs");
    Ok(generated)
}

fn write_region(
    dir: &Path,
    region: &str,
    args: &BuildArgs,
    stations: Payload,
    model: Payload,
) -> BuilderResult<[PathBuf; 2]> {
    let now = Utc::now();

    let summary = SummaryDocument {
        region: region.to_string(),
        run_time_utc: format_iso(&now),
        version: version_stamp(&now),
        tiles_base: args.tiles_base.clone(),
        quicklook_png: args.quicklook.clone(),
        stations: stations.summary,
        model: model.summary,
    };
    let timeseries = TimeseriesDocument {
        region: region.to_string(),
        generated_at: format_iso(&now),
        stations: stations.timeseries,
        model: model.timeseries,
    };

    let summary_path = dir.join(SUMMARY_FILE);
    let timeseries_path = dir.join(TIMESERIES_FILE);
    write_json(&summary_path, &summary)?;
    write_json(&timeseries_path, &timeseries)?;
    Ok([summary_path, timeseries_path])
}
