//! Builder error types.

use std::path::PathBuf;
use thiserror::Error;

pub type BuilderResult<T> = Result<T, BuilderError>;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No CSV files found in directory {}", .0.display())]
    NoCsvFiles(PathBuf),

    #[error("Column '{column}' not found in {source_name}; available columns: {available:?}")]
    MissingColumn {
        column: String,
        source_name: String,
        available: Vec<String>,
    },

    #[error("No rows: {0}")]
    NoRows(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("CSV error in {}: {message}", .path.display())]
    Csv { path: PathBuf, message: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuilderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuilderError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(column: &str, source_name: impl Into<String>, available: &[String]) -> Self {
        let mut available = available.to_vec();
        available.sort();
        BuilderError::MissingColumn {
            column: column.to_string(),
            source_name: source_name.into(),
            available,
        }
    }

    /// True for failures that only mean "no usable data", as opposed to
    /// missing inputs or I/O trouble.
    pub fn is_data_gap(&self) -> bool {
        matches!(
            self,
            BuilderError::MissingColumn { .. } | BuilderError::NoRows(_)
        )
    }
}
