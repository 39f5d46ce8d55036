//! Bundle Builder Library
//!
//! Turns long-format model CSVs and station CSVs into the structured
//! `summary.json` / `timeseries.json` pair served by the dashboard API.

pub mod args;
pub mod error;
pub mod frame;
pub mod model;
pub mod output;
pub mod run;
pub mod station;

use forecast_common::{BandMap, Table, TimeseriesEntry};

pub use args::BuildArgs;
pub use error::{BuilderError, BuilderResult};
pub use model::ModelSpec;
pub use run::run;

/// Band-keyed summary tables and chart entries for one data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub summary: BandMap<Table>,
    pub timeseries: BandMap<TimeseriesEntry>,
}
