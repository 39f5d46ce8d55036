//! Common types and utilities shared across the forecast data services.

pub mod band;
pub mod bundle;
pub mod error;
pub mod forecast;
mod lenient;
pub mod observation;
pub mod region;
pub mod table;
pub mod time;

pub use band::{BandMap, ElevationBand};
pub use bundle::{Artifacts, Manifest, RegionBundle};
pub use error::{BundleError, BundleResult};
pub use forecast::{AvalancheProblem, DangerLevel, DangerRatings, Forecast};
pub use observation::AvalancheObservation;
pub use region::{slugify_region, RegionKey};
pub use table::{Axis, Row, Series, SeriesKind, Table, TimeseriesEntry};
