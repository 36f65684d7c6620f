//! CSV loading into Polars DataFrames.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::discovery::{list_csv_files, table_name_for};
use crate::error::{IngestError, Result};

/// A source table as read from disk, before normalization.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Logical table name (file stem).
    pub name: String,
    /// File the table was read from.
    pub path: PathBuf,
    pub data: DataFrame,
}

/// Reads a single-header CSV file into a DataFrame.
///
/// Column types are inferred from every row so a late non-numeric value
/// keeps the column textual instead of failing the read.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Reads every CSV file in `dir`, naming each table after its file stem.
///
/// Tables are returned in file-name order.
pub fn load_tables(dir: &Path) -> Result<Vec<RawTable>> {
    let files = list_csv_files(dir)?;
    let mut seen = BTreeSet::new();
    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let name = table_name_for(&path)?;
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateTable {
                name,
                dir: dir.to_path_buf(),
            });
        }
        let data = read_csv_table(&path)?;
        debug!(
            table = %name,
            rows = data.height(),
            columns = data.width(),
            path = %path.display(),
            "read source table"
        );
        tables.push(RawTable { name, path, data });
    }
    info!(
        dir = %dir.display(),
        table_count = tables.len(),
        "loaded source tables"
    );
    Ok(tables)
}
