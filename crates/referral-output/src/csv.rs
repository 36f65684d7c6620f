//! CSV writers for pipeline outputs.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::error::{OutputError, Result};

/// Subdirectory holding one normalized CSV per table.
pub const CLEANED_DIR: &str = "csv_cleaned";

/// Subdirectory holding the joined main table.
pub const JOINED_DIR: &str = "csv_joined";

/// Layout used for timestamp cells, e.g. `2024-03-01 17:00:00+07:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Ensure an output subdirectory exists and return its path.
pub fn ensure_output_dir(base_dir: &Path, name: &str) -> Result<PathBuf> {
    let dir = base_dir.join(name);
    fs::create_dir_all(&dir).map_err(|source| OutputError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Write `df` to `<dir>/<name>.csv` with a header row, replacing any
/// existing file. Returns the written path.
pub fn write_csv_table(dir: &Path, name: &str, df: &mut DataFrame) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.csv"));
    let mut file = File::create(&path).map_err(|source| OutputError::CreateFile {
        path: path.clone(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
        .finish(df)
        .map_err(|e| OutputError::CsvWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
    debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_output_dir_is_repeatable() {
        let temp = tempfile::tempdir().unwrap();
        let first = ensure_output_dir(temp.path(), CLEANED_DIR).unwrap();
        let second = ensure_output_dir(temp.path(), CLEANED_DIR).unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_write_creates_header_and_rows() {
        let temp = tempfile::tempdir().unwrap();
        let mut df = DataFrame::new(vec![
            Series::new("referral_id".into(), vec!["r1", "r2"]).into(),
            Series::new("reward_value".into(), vec![Some(50000i64), None]).into(),
        ])
        .unwrap();

        let path = write_csv_table(temp.path(), "user_referrals", &mut df).unwrap();

        assert_eq!(path, temp.path().join("user_referrals.csv"));
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["referral_id,reward_value", "r1,50000", "r2,"]);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp = tempfile::tempdir().unwrap();
        let mut df = DataFrame::new(vec![Series::new("a".into(), vec![1i64]).into()]).unwrap();
        let err = write_csv_table(&temp.path().join("absent"), "t", &mut df).unwrap_err();
        assert!(matches!(err, OutputError::CreateFile { .. }));
    }
}
