//! Format loaders.
//!
//! Each on-disk representation of a region has one loader. A loader reports
//! whether its required file was present and readable; optional pieces that
//! are missing or malformed are logged and left empty.

mod discrete;
mod legacy;
mod structured;

pub use discrete::{DiscreteLoader, STATIONS_TABLE_ID};
pub use legacy::{LegacyBundleLoader, LEGACY_ID};
pub use structured::StructuredLoader;

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use forecast_common::{AvalancheObservation, BundleError, BundleResult, RegionKey};

use crate::csv_rows::{parse_csv, CsvRows};
use crate::layout::DataLayout;
use crate::locator::SourceKind;
use crate::raw::{parse_avalanches, RawBundle};
use crate::store::DataStore;

/// Result of one loader attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The required file was read; the raw bundle may still be partial.
    Loaded(RawBundle),
    /// The required file does not exist.
    Absent,
    /// The required file exists but could not be parsed.
    Malformed(String),
}

/// A loader for one on-disk region format.
#[async_trait]
pub trait FormatLoader: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Load `region` from `store`.
    ///
    /// Returns `Err` only for storage failures other than absence.
    async fn load(
        &self,
        store: &dyn DataStore,
        layout: &DataLayout,
        region: &RegionKey,
    ) -> BundleResult<LoadOutcome>;
}

/// A JSON document read from the store.
#[derive(Debug)]
pub(crate) enum Document {
    Absent,
    Malformed(String),
    Parsed(Value),
}

impl Document {
    pub(crate) fn into_value(self) -> Option<Value> {
        match self {
            Document::Parsed(value) => Some(value),
            _ => None,
        }
    }
}

pub(crate) async fn read_document(store: &dyn DataStore, path: &Path) -> BundleResult<Document> {
    let text = match store.read_to_string(path).await {
        Ok(Some(text)) => text,
        Ok(None) => return Ok(Document::Absent),
        Err(BundleError::Parse(reason)) => {
            warn!(path = %path.display(), reason = %reason, "Unreadable document");
            return Ok(Document::Malformed(reason));
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_str(&text) {
        Ok(value) => Ok(Document::Parsed(value)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed JSON document");
            Ok(Document::Malformed(e.to_string()))
        }
    }
}

/// Read an optional JSON document; absence and malformation both yield `None`.
pub(crate) async fn read_optional(store: &dyn DataStore, path: &Path) -> BundleResult<Option<Value>> {
    Ok(read_document(store, path).await?.into_value())
}

/// Read an optional CSV file; absence and malformation both yield `None`.
pub(crate) async fn read_csv(store: &dyn DataStore, path: &Path) -> BundleResult<Option<CsvRows>> {
    let text = match store.read_to_string(path).await {
        Ok(Some(text)) => text,
        Ok(None) => return Ok(None),
        Err(BundleError::Parse(reason)) => {
            warn!(path = %path.display(), reason = %reason, "Unreadable CSV file");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    match parse_csv(&text) {
        Ok(rows) => Ok(Some(rows)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed CSV file");
            Ok(None)
        }
    }
}

/// Merge shared and per-region observations for `region`.
///
/// Shared records must carry a matching region tag. Per-region records are
/// kept when untagged or matching. Shared records come first.
pub(crate) async fn union_avalanches(
    store: &dyn DataStore,
    layout: &DataLayout,
    region: &RegionKey,
    regional: Vec<AvalancheObservation>,
) -> BundleResult<Vec<AvalancheObservation>> {
    let shared_doc = read_optional(store, &layout.shared_avalanches()).await?;
    let shared = parse_avalanches(shared_doc.as_ref());

    Ok(shared
        .into_iter()
        .filter(|obs| obs.is_tagged(region))
        .chain(regional.into_iter().filter(|obs| obs.belongs_to(region)))
        .collect())
}
