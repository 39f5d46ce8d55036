//! Weather station observations: loading and payload construction.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use forecast_common::table::Row;
use forecast_common::time::{format_iso, parse_timestamp};
use forecast_common::{slugify_region, Axis, ElevationBand, Series, Table, TimeseriesEntry};

use crate::error::{BuilderError, BuilderResult};
use crate::frame::{csv_paths, infer_region_band, numeric, round4, DateRange, Frame, Record};
use crate::Payload;

/// Station id used when the data has no id column.
pub const DEFAULT_STATION_ID: &str = "station";

#[derive(Debug, Clone)]
pub struct StationColumns {
    pub region: String,
    pub band: String,
    pub time: String,
    pub id: String,
    pub name: String,
}

impl Default for StationColumns {
    fn default() -> Self {
        Self {
            region: "region".to_string(),
            band: "elevation_band".to_string(),
            time: "obs_time".to_string(),
            id: "station_id".to_string(),
            name: "station_name".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StationRow {
    pub time: DateTime<Utc>,
    pub band: ElevationBand,
    pub id: String,
    pub name: Option<String>,
    pub cells: Record,
}

#[derive(Debug, Clone, Default)]
pub struct StationData {
    pub rows: Vec<StationRow>,
    /// Every column seen in files that contributed rows.
    pub columns: Vec<String>,
    pub has_name: bool,
}

/// Distinct region slugs in the station files. Files without a region
/// column contribute the region encoded in their name, if any.
pub fn station_regions(path: &Path, region_column: &str) -> BuilderResult<Vec<String>> {
    let mut regions = Vec::new();
    for file in csv_paths(path)? {
        let frame = Frame::read(&file)?;
        let found: Vec<String> = if frame.has_column(region_column) {
            frame
                .rows
                .iter()
                .filter_map(|row| row.get(region_column))
                .map(|value| slugify_region(value))
                .collect()
        } else {
            infer_region_band(&file)
                .0
                .map(|hint| slugify_region(&hint))
                .into_iter()
                .collect()
        };
        for slug in found {
            if !slug.is_empty() && !regions.contains(&slug) {
                regions.push(slug);
            }
        }
    }
    regions.sort();
    Ok(regions)
}

const TIME_FALLBACKS: [&str; 4] = ["obs_time", "timestamp", "UTC_DATE", "utc_date"];

pub fn load_stations(
    path: &Path,
    region: &str,
    cols: &StationColumns,
    range: &DateRange,
) -> BuilderResult<StationData> {
    let target = slugify_region(region);
    let files: Vec<PathBuf> = csv_paths(path)?;
    debug!(files = files.len(), region, "Loading station CSV files");

    let mut data = StationData::default();
    let mut matched = 0usize;

    for file in &files {
        let mut frame = Frame::read(file)?;
        let source = file.display().to_string();
        let (region_hint, band_hint) = infer_region_band(file);

        let region_hint = if frame.has_column(&cols.region) {
            None
        } else {
            match region_hint {
                Some(hint) => Some(hint),
                None => {
                    return Err(BuilderError::missing_column(&cols.region, source, &frame.columns))
                }
            }
        };

        let rows: Vec<Record> = std::mem::take(&mut frame.rows)
            .into_iter()
            .filter(|cells| {
                let tag = region_hint.as_ref().or_else(|| cells.get(&cols.region));
                tag.is_some_and(|value| slugify_region(value) == target)
            })
            .collect();
        if rows.is_empty() {
            continue;
        }
        matched += rows.len();

        let has_band = frame.columns.contains(&cols.band);
        if !has_band && band_hint.is_none() {
            return Err(BuilderError::missing_column(&cols.band, source, &frame.columns));
        }

        let mut candidates = vec![cols.time.as_str()];
        candidates.extend(TIME_FALLBACKS);
        let Some(time_column) = frame.resolve_column(&candidates) else {
            return Err(BuilderError::missing_column(&cols.time, source, &frame.columns));
        };
        if time_column != cols.time {
            debug!(preferred = %cols.time, using = %time_column, "Station time column fallback");
        }

        for column in &frame.columns {
            if !data.columns.contains(column) {
                data.columns.push(column.clone());
            }
        }
        data.has_name |= frame.columns.contains(&cols.name);

        for cells in rows {
            let band = match cells.get(&cols.band) {
                Some(label) if has_band => ElevationBand::parse(label),
                _ if has_band => None,
                _ => band_hint,
            };
            let Some(band) = band else {
                continue;
            };
            let Some(time) = cells.get(&time_column).and_then(|t| parse_timestamp(t)) else {
                continue;
            };
            if !range.contains(&time) {
                continue;
            }
            data.rows.push(StationRow {
                time,
                band,
                id: cells
                    .get(&cols.id)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_STATION_ID.to_string()),
                name: cells.get(&cols.name).cloned(),
                cells,
            });
        }
    }

    if matched == 0 {
        return Err(BuilderError::NoRows(format!(
            "No station rows matching region='{}' in provided station CSV files",
            region
        )));
    }
    debug!(region, rows = matched, "Station rows before filtering");

    if data.rows.is_empty() {
        return Err(BuilderError::NoRows(format!(
            "No station rows remaining after applying date filters for region='{}'",
            region
        )));
    }
    debug!(region, rows = data.rows.len(), "Station rows after filters");
    Ok(data)
}

fn latest_per_station<'a>(rows: &[&'a StationRow]) -> Vec<&'a StationRow> {
    let mut last: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        last.insert(row.id.as_str(), idx);
    }
    let mut picks: Vec<usize> = last.into_values().collect();
    picks.sort_unstable();
    picks.into_iter().map(|idx| rows[idx]).collect()
}

pub fn build_payload(data: &StationData, metrics: &[String], cols: &StationColumns) -> Payload {
    let mut payload = Payload::default();
    let present: Vec<&String> = metrics
        .iter()
        .filter(|m| data.columns.contains(m))
        .collect();

    let mut columns = vec![cols.id.clone()];
    if data.has_name {
        columns.push(cols.name.clone());
    }
    columns.push(cols.time.clone());
    columns.extend(present.iter().map(|m| m.to_string()));

    for band in ElevationBand::ALL {
        let mut band_rows: Vec<&StationRow> = data.rows.iter().filter(|r| r.band == band).collect();
        if band_rows.is_empty() {
            continue;
        }
        band_rows.sort_by_key(|r| r.time);

        let table_rows: Vec<Row> = latest_per_station(&band_rows)
            .into_iter()
            .map(|station| {
                let mut row = Row::new();
                row.insert(cols.id.clone(), Value::String(station.id.clone()));
                if data.has_name {
                    row.insert(
                        cols.name.clone(),
                        station.name.clone().map_or(Value::Null, Value::String),
                    );
                }
                row.insert(cols.time.clone(), Value::String(format_iso(&station.time)));
                for metric in &present {
                    let value = numeric(station.cells.get(*metric));
                    row.insert(metric.to_string(), value.map_or(Value::Null, |v| json!(v)));
                }
                row
            })
            .collect();
        let count = table_rows.len();
        payload.summary.push(
            band,
            Table::new(columns.clone(), table_rows).with_metadata(json!({ "count": count })),
        );

        if present.is_empty() {
            continue;
        }
        let mut stations: BTreeMap<&str, Vec<&StationRow>> = BTreeMap::new();
        for row in band_rows.iter().copied() {
            stations.entry(row.id.as_str()).or_default().push(row);
        }
        for (id, rows) in stations {
            let series = present
                .iter()
                .map(|metric| {
                    let values = rows
                        .iter()
                        .map(|r| numeric(r.cells.get(*metric)).map(round4))
                        .collect();
                    Series::new(metric.to_string(), values).on_axis(Axis::Y)
                })
                .collect();

            let name = rows
                .first()
                .and_then(|r| r.name.clone())
                .unwrap_or_else(|| id.to_string());
            let mut entry = TimeseriesEntry {
                x: rows.iter().map(|r| format_iso(&r.time)).collect(),
                station_id: Some(id.to_string()),
                station_name: Some(name),
                series,
                ..Default::default()
            };
            entry.label = entry.derived_label();
            payload.timeseries.push(band, entry);
        }
    }
    payload
}
