//! Structured output documents and where they are written.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use forecast_common::{BandMap, Table, TimeseriesEntry};

use crate::error::{BuilderError, BuilderResult};

pub const DEFAULT_OUTPUT_ROOT: &str = "public/data";
pub const SUMMARY_FILE: &str = "summary.json";
pub const TIMESERIES_FILE: &str = "timeseries.json";

#[derive(Debug, Clone, Serialize)]
pub struct SummaryDocument {
    pub region: String,
    pub run_time_utc: String,
    pub version: String,
    pub tiles_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quicklook_png: Option<String>,
    pub stations: BandMap<Table>,
    pub model: BandMap<Table>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeseriesDocument {
    pub region: String,
    pub generated_at: String,
    pub stations: BandMap<TimeseriesEntry>,
    pub model: BandMap<TimeseriesEntry>,
}

fn is_json_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Reject a `.json` output target when more than one region is built.
pub fn check_output(output: Option<&Path>, region_count: usize) -> BuilderResult<()> {
    match output {
        Some(path) if region_count > 1 && is_json_file(path) => Err(BuilderError::InvalidArgument(
            "When generating multiple regions, --output must be a directory".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Directory receiving one region's documents.
///
/// A single-region `.json` target `x/y.json` writes under `x/y/`; any other
/// target is a root holding one directory per region.
pub fn region_dir(output: Option<&Path>, region: &str, multi_region: bool) -> PathBuf {
    match output {
        Some(path) if is_json_file(path) && !multi_region => path.with_extension(""),
        Some(path) => path.join(region),
        None => Path::new(DEFAULT_OUTPUT_ROOT).join(region),
    }
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> BuilderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuilderError::io(parent, e))?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).map_err(|e| BuilderError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_dir() {
        assert_eq!(
            region_dir(Some(Path::new("out/whistler.json")), "whistler", false),
            PathBuf::from("out/whistler")
        );
        assert_eq!(
            region_dir(Some(Path::new("out")), "whistler", true),
            PathBuf::from("out/whistler")
        );
        assert_eq!(
            region_dir(None, "whistler", false),
            PathBuf::from("public/data/whistler")
        );
    }

    #[test]
    fn test_check_output() {
        assert!(check_output(Some(Path::new("x.json")), 2).is_err());
        assert!(check_output(Some(Path::new("x.json")), 1).is_ok());
        assert!(check_output(Some(Path::new("out")), 3).is_ok());
        assert!(check_output(None, 3).is_ok());
    }

    #[test]
    fn test_write_json_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/summary.json");
        write_json(&path, &serde_json::json!({"region": "whistler"})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"region\""));
    }
}
