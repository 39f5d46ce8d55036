//! Weather model rows: loading, spec discovery and payload construction.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use forecast_common::table::Row;
use forecast_common::time::{format_iso, parse_timestamp};
use forecast_common::{slugify_region, Axis, ElevationBand, Series, Table, TimeseriesEntry};

use crate::error::{BuilderError, BuilderResult};
use crate::frame::{numeric, round4, DateRange, Frame, Record};
use crate::Payload;

/// A model variable/level pair and the metric columns to publish for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub variable: String,
    pub level: String,
    pub metrics: Vec<String>,
}

impl FromStr for ModelSpec {
    type Err = BuilderError;

    /// Accepts `VAR@LEVEL:m1,m2` or `VAR:LEVEL:m1,m2`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let malformed = || {
            BuilderError::InvalidArgument(format!(
                "Model spec '{}' must look like VAR@LEVEL:metric1,metric2",
                raw
            ))
        };

        let (variable, level, metrics) = if raw.contains('@') {
            let (head, metrics) = raw.split_once(':').ok_or_else(malformed)?;
            let (variable, level) = head.split_once('@').ok_or_else(malformed)?;
            (variable, level, metrics)
        } else {
            let mut parts = raw.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(variable), Some(level), Some(metrics)) => (variable, level, metrics),
                _ => return Err(malformed()),
            }
        };

        let metrics: Vec<String> = metrics
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if metrics.is_empty() {
            return Err(BuilderError::InvalidArgument(format!(
                "Model spec '{}' must include at least one metric",
                raw
            )));
        }

        Ok(Self {
            variable: variable.trim().to_string(),
            level: level.trim().to_string(),
            metrics,
        })
    }
}

/// Preferred model column names. Each falls back to conventional spellings.
#[derive(Debug, Clone)]
pub struct ModelColumns {
    pub region: String,
    pub band: String,
    pub time: String,
    pub variable: String,
    pub level: String,
}

impl Default for ModelColumns {
    fn default() -> Self {
        Self {
            region: "region".to_string(),
            band: "elevation_band".to_string(),
            time: "valid_date".to_string(),
            variable: "variable".to_string(),
            level: "level".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRow {
    pub time: DateTime<Utc>,
    pub band: ElevationBand,
    pub variable: String,
    pub level: String,
    pub cells: Record,
}

/// Model rows for one region after region, time and band filtering.
#[derive(Debug, Clone)]
pub struct ModelData {
    /// Output name of the time column.
    pub time_column: String,
    /// Candidate metric columns, in first-seen order.
    pub numeric_columns: Vec<String>,
    pub rows: Vec<ModelRow>,
}

struct Resolved {
    band: String,
    time: String,
    variable: String,
    level: String,
}

fn pick(frame: &Frame, preferred: &str, fallbacks: &[&str], source: &str) -> BuilderResult<String> {
    let mut candidates = vec![preferred];
    candidates.extend(fallbacks.iter().copied());
    frame
        .resolve_column(&candidates)
        .ok_or_else(|| BuilderError::missing_column(preferred, source, &frame.columns))
}

fn resolve(frame: &Frame, cols: &ModelColumns, source: &str) -> BuilderResult<Resolved> {
    if !frame.has_column(&cols.region) {
        return Err(BuilderError::missing_column(&cols.region, source, &frame.columns));
    }
    Ok(Resolved {
        band: pick(frame, &cols.band, &["elevation_band", "elevation", "band"], source)?,
        time: pick(frame, &cols.time, &["valid_date", "timestamp", "time"], source)?,
        variable: pick(frame, &cols.variable, &["variable"], source)?,
        level: pick(frame, &cols.level, &["level"], source)?,
    })
}

/// Distinct region slugs present in the model files.
pub fn model_regions(paths: &[PathBuf], region_column: &str) -> BuilderResult<Vec<String>> {
    let mut regions = Vec::new();
    for path in paths {
        let frame = Frame::read(path)?;
        if !frame.has_column(region_column) {
            return Err(BuilderError::missing_column(
                region_column,
                path.display().to_string(),
                &frame.columns,
            ));
        }
        for row in &frame.rows {
            if let Some(value) = row.get(region_column) {
                let slug = slugify_region(value);
                if !slug.is_empty() && !regions.contains(&slug) {
                    regions.push(slug);
                }
            }
        }
    }
    regions.sort();
    Ok(regions)
}

pub fn load_model(
    paths: &[PathBuf],
    region: &str,
    cols: &ModelColumns,
    range: &DateRange,
) -> BuilderResult<ModelData> {
    let target = slugify_region(region);
    let mut matched = 0usize;
    let mut timed = Vec::new();
    let mut numeric_columns: Vec<String> = Vec::new();
    let mut excluded: Vec<String> = vec![cols.region.clone(), cols.time.clone()];

    for path in paths {
        let frame = Frame::read(path)?;
        let resolved = resolve(&frame, cols, &path.display().to_string())?;
        excluded.extend([
            resolved.band.clone(),
            resolved.time.clone(),
            resolved.variable.clone(),
            resolved.level.clone(),
        ]);
        for column in &frame.columns {
            if !numeric_columns.contains(column) {
                numeric_columns.push(column.clone());
            }
        }

        for cells in frame.rows {
            let in_region = cells
                .get(&cols.region)
                .is_some_and(|value| slugify_region(value) == target);
            if !in_region {
                continue;
            }
            matched += 1;

            let Some(time) = cells.get(&resolved.time).and_then(|t| parse_timestamp(t)) else {
                continue;
            };
            if !range.contains(&time) {
                continue;
            }
            let band = cells.get(&resolved.band).and_then(|b| ElevationBand::parse(b));
            let variable = cells.get(&resolved.variable).cloned().unwrap_or_default();
            let level = cells.get(&resolved.level).cloned().unwrap_or_default();
            timed.push((time, band, variable, level, cells));
        }
    }

    if matched == 0 {
        return Err(BuilderError::NoRows(format!(
            "No records matching region='{}' in provided model files",
            region
        )));
    }
    debug!(region, rows = matched, "Model rows before filtering");

    if timed.is_empty() {
        return Err(BuilderError::NoRows(format!(
            "No model rows remaining after applying date filters for region='{}'",
            region
        )));
    }

    let rows: Vec<ModelRow> = timed
        .into_iter()
        .filter_map(|(time, band, variable, level, cells)| {
            band.map(|band| ModelRow {
                time,
                band,
                variable,
                level,
                cells,
            })
        })
        .collect();
    if rows.is_empty() {
        return Err(BuilderError::NoRows(format!(
            "No model rows with recognized elevation bands for region='{}'",
            region
        )));
    }

    numeric_columns.retain(|column| {
        !excluded.contains(column)
            && rows.iter().all(|row| {
                row.cells
                    .get(column)
                    .map_or(true, |cell| cell.trim().parse::<f64>().is_ok())
            })
    });

    debug!(region, rows = rows.len(), "Model rows after filters");
    Ok(ModelData {
        time_column: cols.time.clone(),
        numeric_columns,
        rows,
    })
}

/// One spec per distinct (variable, level) pair, carrying every numeric
/// column with at least one value for that pair.
pub fn discover_specs(data: &ModelData) -> Vec<ModelSpec> {
    let mut specs: Vec<ModelSpec> = Vec::new();
    for row in &data.rows {
        if specs
            .iter()
            .any(|s| s.variable == row.variable && s.level == row.level)
        {
            continue;
        }
        let subset: Vec<&ModelRow> = data
            .rows
            .iter()
            .filter(|r| r.variable == row.variable && r.level == row.level)
            .collect();
        let metrics: Vec<String> = data
            .numeric_columns
            .iter()
            .filter(|column| subset.iter().any(|r| numeric(r.cells.get(*column)).is_some()))
            .cloned()
            .collect();
        if metrics.is_empty() {
            continue;
        }
        specs.push(ModelSpec {
            variable: row.variable.clone(),
            level: row.level.clone(),
            metrics,
        });
    }
    specs
}

fn number(value: Option<f64>) -> Value {
    value.map_or(Value::Null, |v| json!(v))
}

pub fn build_payload(data: &ModelData, specs: &[ModelSpec]) -> Payload {
    let mut payload = Payload::default();
    let time_col = &data.time_column;

    for spec in specs {
        let mut subset: Vec<&ModelRow> = data
            .rows
            .iter()
            .filter(|r| r.variable == spec.variable && r.level == spec.level)
            .collect();
        if subset.is_empty() {
            continue;
        }
        subset.sort_by_key(|r| r.time);

        let mut columns = vec![time_col.clone()];
        columns.extend(spec.metrics.iter().cloned());
        let metadata = json!({
            "variable": spec.variable,
            "level": spec.level,
            "metrics": spec.metrics,
        });

        for band in ElevationBand::ALL {
            let band_rows: Vec<&ModelRow> =
                subset.iter().copied().filter(|r| r.band == band).collect();
            let Some(latest) = band_rows.last() else {
                continue;
            };

            let mut row = Row::new();
            row.insert(time_col.clone(), Value::String(format_iso(&latest.time)));
            for metric in &spec.metrics {
                row.insert(metric.clone(), number(numeric(latest.cells.get(metric))));
            }
            payload.summary.push(
                band,
                Table::new(columns.clone(), vec![row]).with_metadata(metadata.clone()),
            );

            let series: Vec<Series> = spec
                .metrics
                .iter()
                .enumerate()
                .filter(|(_, metric)| data.numeric_columns.contains(metric))
                .map(|(idx, metric)| {
                    let values = band_rows
                        .iter()
                        .map(|r| numeric(r.cells.get(metric)).map(round4))
                        .collect();
                    let axis = if idx == 0 { Axis::Y } else { Axis::Y2 };
                    Series::new(format!("{} {}", spec.variable, metric), values).on_axis(axis)
                })
                .collect();
            if series.is_empty() {
                continue;
            }

            let mut entry = TimeseriesEntry {
                x: band_rows.iter().map(|r| format_iso(&r.time)).collect(),
                variable: Some(spec.variable.clone()),
                level: Some(spec.level.clone()),
                series,
                metadata: Some(json!({ "metrics": spec.metrics })),
                ..Default::default()
            };
            entry.label = entry.derived_label();
            payload.timeseries.push(band, entry);
        }
    }
    payload
}
