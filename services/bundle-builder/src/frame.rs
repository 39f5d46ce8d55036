//! Header-keyed CSV tables and the column/band/time helpers shared by the
//! model and station loaders.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use forecast_common::band::BAND_ALIASES;
use forecast_common::ElevationBand;

use crate::error::{BuilderError, BuilderResult};

/// One CSV row keyed by header.
pub type Record = HashMap<String, String>;

/// A CSV file read into memory.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Frame {
    pub fn read(path: &Path) -> BuilderResult<Self> {
        if !path.is_file() {
            return Err(BuilderError::FileNotFound(path.to_path_buf()));
        }

        let csv_err = |e: csv::Error| BuilderError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let columns: Vec<String> = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_err)?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let row: Record = columns
                .iter()
                .zip(record.iter())
                .filter(|(column, field)| !column.is_empty() && !field.trim().is_empty())
                .map(|(column, field)| (column.clone(), field.trim().to_string()))
                .collect();
            rows.push(row);
        }

        debug!(path = %path.display(), rows = rows.len(), "Read CSV");
        Ok(Self { columns, rows })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// First candidate present as a column.
    pub fn resolve_column(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|candidate| self.has_column(candidate))
            .map(|c| c.to_string())
    }
}

/// Expand a CSV path: a file is itself, a directory yields its `*.csv` files
/// in name order.
pub fn csv_paths(path: &Path) -> BuilderResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(BuilderError::FileNotFound(path.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(BuilderError::NoCsvFiles(path.to_path_buf()));
    }
    debug!(count = paths.len(), dir = %path.display(), "Found CSV files");
    Ok(paths)
}

/// Band alias labels, longest first so `below_treeline` is tried before
/// `treeline`.
fn band_tokens() -> Vec<(&'static str, ElevationBand)> {
    let mut tokens = BAND_ALIASES.to_vec();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    tokens
}

/// Region slug and band encoded in a file name such as
/// `south_rockies_alpine_2024.csv` or `south_rockies_below_treeline.csv`.
pub fn infer_region_band(path: &Path) -> (Option<String>, Option<ElevationBand>) {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return (None, None);
    };
    let stem = stem.to_lowercase();
    let tokens = band_tokens();

    for (token, band) in &tokens {
        let marker = format!("_{}_", token);
        if let Some(idx) = stem.find(&marker) {
            return (Some(stem[..idx].to_string()), Some(*band));
        }
    }
    for (token, band) in &tokens {
        let suffix = format!("_{}", token);
        if let Some(region) = stem.strip_suffix(&suffix) {
            return (Some(region.trim_end_matches('_').to_string()), Some(*band));
        }
    }
    (None, None)
}

/// Inclusive UTC time window. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> BuilderResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(BuilderError::InvalidArgument(
                    "--start-date must be before or equal to --end-date".to_string(),
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }
}

/// Parse a numeric cell; empty, unparseable and non-finite cells are `None`.
pub fn numeric(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_utils::assert_close;

    #[test]
    fn test_infer_region_band_marker() {
        let (region, band) = infer_region_band(Path::new("/x/South_Rockies_alpine_2024.csv"));
        assert_eq!(region.as_deref(), Some("south_rockies"));
        assert_eq!(band, Some(ElevationBand::AboveTreeline));
    }

    #[test]
    fn test_infer_region_band_suffix_prefers_longest_token() {
        let (region, band) = infer_region_band(Path::new("whistler_below_treeline.csv"));
        assert_eq!(region.as_deref(), Some("whistler"));
        assert_eq!(band, Some(ElevationBand::BelowTreeline));

        assert_eq!(infer_region_band(Path::new("stations.csv")), (None, None));
    }

    #[test]
    fn test_date_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let range = DateRange::new(Some(start), Some(end)).unwrap();

        assert!(range.contains(&start));
        assert!(range.contains(&end));
        assert!(!range.contains(&Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 1).unwrap()));
        assert!(DateRange::new(Some(end), Some(start)).is_err());
    }

    #[test]
    fn test_numeric_and_round() {
        assert_close!(round4(numeric(Some(&"1.23456".to_string())).unwrap()), 1.2346);
        assert_close!(round4(-20.123456), -20.1235);
        assert_eq!(numeric(Some(&"NaN".to_string())), None);
        assert_eq!(numeric(None), None);
    }

    #[test]
    fn test_read_and_expand_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "region,temp_c\nwhistler,1\n\n").unwrap();
        std::fs::write(dir.path().join("a.CSV"), "region\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let paths = csv_paths(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.CSV"));

        let frame = Frame::read(&paths[1]).unwrap();
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.resolve_column(&["missing", "temp_c"]).as_deref(), Some("temp_c"));

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(csv_paths(empty.path()), Err(BuilderError::NoCsvFiles(_))));
    }
}
