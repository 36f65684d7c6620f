use std::path::PathBuf;

/// Outcome of one `referral run`.
#[derive(Debug)]
pub struct RunResult {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Reference instant the rules were evaluated against (RFC 3339).
    pub reference_time: String,
    pub tables: Vec<TableSummary>,
    /// CSV files that were not processed.
    pub ignored: Vec<PathBuf>,
    pub main_table: MainTableSummary,
}

/// One cleaned table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_dropped: usize,
    pub output: PathBuf,
}

/// The joined main table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainTableSummary {
    pub rows: usize,
    pub valid: usize,
    pub invalid: usize,
    pub output: PathBuf,
}
