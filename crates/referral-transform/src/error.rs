//! Error types for referral transformations.

use thiserror::Error;

/// Errors raised by the transformation stages.
///
/// Only a missing anchor table is a business-level failure; everything else
/// wraps a DataFrame operation that could not be performed.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The referral fact table is required to build the joined view.
    #[error("anchor table '{table}' not found")]
    MissingAnchorTable { table: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_anchor_display() {
        let err = TransformError::MissingAnchorTable {
            table: "user_referrals".to_string(),
        };
        assert_eq!(err.to_string(), "anchor table 'user_referrals' not found");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let err: TransformError = polars_err.into();
        assert!(matches!(err, TransformError::DataFrame { .. }));
    }
}
