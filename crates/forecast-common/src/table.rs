//! Pre-rendered tables and chart-ready time series.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// A sparse table row keyed by column name. Missing cells render as empty.
pub type Row = Map<String, Value>;

/// A table with an explicit column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Row>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            id: None,
            columns,
            rows,
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Append any row key missing from `columns`, in first-seen order.
    pub fn complete_columns(&mut self) {
        for row in &self.rows {
            for key in row.keys() {
                if !self.columns.iter().any(|c| c == key) {
                    self.columns.push(key.clone());
                }
            }
        }
    }
}

/// Secondary axes a series may be plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Y,
    Y2,
    Y3,
}

/// Rendering hint for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Bar,
}

/// One named numeric series sharing its entry's x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,

    #[serde(default)]
    pub values: Vec<Option<f64>>,

    #[serde(default, alias = "y_axis", skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,

    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SeriesKind>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            y_axis: None,
            kind: None,
        }
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.y_axis = Some(axis);
        self
    }
}

/// A chart entry: a shared x axis plus one or more series.
///
/// Station entries carry `station_id`/`station_name`; model entries carry
/// `variable`/`level`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesEntry {
    #[serde(default)]
    pub x: Vec<String>,

    #[serde(default)]
    pub label: String,

    #[serde(
        default,
        alias = "station_id",
        deserialize_with = "lenient::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub station_id: Option<String>,

    #[serde(
        default,
        alias = "station_name",
        deserialize_with = "lenient::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub station_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub variable: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<String>,

    #[serde(default)]
    pub series: Vec<Series>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl TimeseriesEntry {
    /// Best available identifying label for the entry.
    pub fn derived_label(&self) -> String {
        if let Some(name) = self.station_name.as_ref().or(self.station_id.as_ref()) {
            return name.clone();
        }
        match (&self.variable, &self.level) {
            (Some(variable), Some(level)) => format!("{} @ {}", variable, level),
            (Some(variable), None) => variable.clone(),
            _ => "series".to_string(),
        }
    }
}
