//! Named table frames.

use std::path::PathBuf;

use polars::prelude::DataFrame;

/// A table flowing through the pipeline: its logical name and its data.
#[derive(Debug, Clone)]
pub struct TableFrame {
    /// Logical table name (e.g. "user_referrals", "lead_log").
    pub name: String,
    /// The table contents.
    pub data: DataFrame,
    /// Source file the table was read from, when known.
    pub source: Option<PathBuf>,
}

impl TableFrame {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }

    /// Returns the number of records in the frame.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}

/// Find a table by logical name.
pub fn find_table<'a>(tables: &'a [TableFrame], name: &str) -> Option<&'a TableFrame> {
    tables.iter().find(|table| table.name == name)
}
