//! Error types for csvcombine-core

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in csvcombine-core
#[derive(Debug, Error)]
pub enum Error {
    /// A resource after the first produced a different header
    #[error("inconsistent headers (file {resource})")]
    InconsistentHeader { resource: String },

    /// Resource content is not valid UTF-8
    #[error("failed to decode '{resource}' as UTF-8: {source}")]
    Decode {
        resource: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// A data row has more cells than the header has columns
    #[error("row {row} in '{resource}' has {cells} cells but the header has {columns} columns")]
    RowTooWide {
        resource: String,
        row: usize,
        cells: usize,
        columns: usize,
    },

    /// The selector matched nothing and the empty policy is fatal
    #[error("No input files found.")]
    NoInputFiles,

    /// All matched resources together yielded no data rows
    #[error("No rows found in input files.")]
    NoRowsProduced,

    /// A configuration value failed validation
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The store has no resource under this project and name
    #[error("resource '{name}' not found in project '{project}'")]
    ResourceNotFound { project: String, name: String },

    /// The session is not allowed to read from this project
    #[error("access to project '{project}' denied for this session")]
    AccessDenied { project: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{resource}': {source}")]
    Csv {
        resource: String,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
