//! Command-line arguments.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use forecast_common::bundle::DEFAULT_TILES_BASE;
use forecast_common::time::parse_timestamp;

use crate::error::BuilderResult;
use crate::frame::DateRange;
use crate::model::{ModelColumns, ModelSpec};
use crate::station::StationColumns;

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("invalid date/time '{}'", value))
}

/// Build structured region summaries and timeseries
#[derive(Parser, Debug, Clone)]
#[command(name = "bundle-builder")]
#[command(about = "Generate summary.json and timeseries.json for each region")]
pub struct BuildArgs {
    /// Region slug (e.g. south_rockies). Omit to build every discovered region
    #[arg(long)]
    pub region: Option<String>,

    /// One or more long-format weather model CSV files
    #[arg(long = "model-csv", required = true, num_args = 1..)]
    pub model_csv: Vec<PathBuf>,

    /// Station CSV file or a directory of station CSV files
    #[arg(long)]
    pub station_csv: PathBuf,

    /// Output root directory, or `<name>.json` for a single region
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Model variable spec, VAR@LEVEL:metric1,metric2 (repeatable)
    #[arg(long = "model-spec")]
    pub model_spec: Vec<ModelSpec>,

    /// Comma-separated station columns to include
    #[arg(long, default_value = "temp_c,wind_mps,hs_cm")]
    pub station_metrics: String,

    #[arg(long, default_value = "region")]
    pub model_region_column: String,
    #[arg(long, default_value = "elevation_band")]
    pub model_band_column: String,
    #[arg(long, default_value = "valid_date")]
    pub model_time_column: String,
    #[arg(long, default_value = "variable")]
    pub model_variable_column: String,
    #[arg(long, default_value = "level")]
    pub model_level_column: String,

    #[arg(long, default_value = "region")]
    pub station_region_column: String,
    #[arg(long, default_value = "elevation_band")]
    pub station_band_column: String,
    #[arg(long, default_value = "obs_time")]
    pub station_time_column: String,
    #[arg(long, default_value = "station_id")]
    pub station_id_column: String,
    #[arg(long, default_value = "station_name")]
    pub station_name_column: String,

    /// Map tile base URL recorded in the summary
    #[arg(long, default_value = DEFAULT_TILES_BASE)]
    pub tiles_base: String,

    /// Optional quicklook image path
    #[arg(long)]
    pub quicklook: Option<String>,

    /// Inclusive UTC start (e.g. 2024-01-01 or 2024-01-01T12:00Z)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<DateTime<Utc>>,

    /// Inclusive UTC end
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<DateTime<Utc>>,

    /// Enable progress logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub fn date_range(&self) -> BuilderResult<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn station_metric_list(&self) -> Vec<String> {
        self.station_metrics
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn model_columns(&self) -> ModelColumns {
        ModelColumns {
            region: self.model_region_column.clone(),
            band: self.model_band_column.clone(),
            time: self.model_time_column.clone(),
            variable: self.model_variable_column.clone(),
            level: self.model_level_column.clone(),
        }
    }

    pub fn station_columns(&self) -> StationColumns {
        StationColumns {
            region: self.station_region_column.clone(),
            band: self.station_band_column.clone(),
            time: self.station_time_column.clone(),
            id: self.station_id_column.clone(),
            name: self.station_name_column.clone(),
        }
    }
}
