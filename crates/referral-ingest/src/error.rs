//! Error types for referral data ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while discovering or reading source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File name has no usable stem to name the table after.
    #[error("cannot derive a table name from {path}")]
    InvalidTableName { path: PathBuf },

    /// Two files map to the same table name (e.g. `a.csv` and `a.CSV`).
    #[error("table '{name}' provided by more than one file in {dir}")]
    DuplicateTable { name: String, dir: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
