//! Error types for bundle resolution.

use thiserror::Error;

/// Result type alias using BundleError.
pub type BundleResult<T> = Result<T, BundleError>;

/// Primary error type for bundle resolution.
///
/// Missing or unparseable source files are not errors; loaders absorb them.
/// These variants cover the conditions that do escape to the caller.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Invalid region identifier: '{0}'")]
    InvalidRegion(String),

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BundleError {
    /// Wrap an I/O failure with the path it occurred on.
    pub fn storage(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        BundleError::Storage {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            BundleError::InvalidRegion(_) => 400,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::Storage {
            path: "-".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::Parse(format!("JSON error: {}", err))
    }
}
