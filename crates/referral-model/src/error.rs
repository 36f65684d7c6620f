//! Error types for pipeline configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a pipeline configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::PipelineConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A shared-name join step would drop the anchor's own key column.
    #[error("join step for '{table}' drops its own anchor key '{column}'")]
    DropsAnchorKey { table: String, column: String },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
