//! Referral processing pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read source CSV files and keep the known tables
//! 2. **Normalize**: per-table type coercion and duplicate removal
//! 3. **Write cleaned**: one CSV per normalized table
//! 4. **Build**: join, enrich and evaluate the reward rules
//! 5. **Write joined**: the main table CSV
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use referral_ingest::load_tables;
use referral_model::{JOINED_TABLE, PipelineConfig, is_recognized_table};
use referral_output::{CLEANED_DIR, JOINED_DIR, ensure_output_dir, write_csv_table};
use referral_transform::{Clock, NormalizeReport, ReferralView, TableFrame, build_main_table, normalize_tables};

use crate::types::{MainTableSummary, RunResult, TableSummary};

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: PipelineConfig,
    /// Normalize and write CSVs whose names are not known tables.
    pub include_unknown: bool,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    /// Tables to process, in name order.
    pub tables: Vec<TableFrame>,
    /// Files skipped because their table name is unknown.
    pub ignored: Vec<PathBuf>,
}

/// True when the configuration or the built-in table list knows `name`.
pub fn is_known_table(name: &str, config: &PipelineConfig) -> bool {
    is_recognized_table(name) || config.tables.get(name).is_some() || config.join_plan.step_for(name).is_some()
}

/// Load every CSV in `input_dir` and keep the tables the run will process.
pub fn ingest(input_dir: &Path, config: &PipelineConfig, include_unknown: bool) -> Result<IngestResult> {
    let raw = load_tables(input_dir).with_context(|| format!("load tables from {}", input_dir.display()))?;
    let mut tables = Vec::with_capacity(raw.len());
    let mut ignored = Vec::new();
    for table in raw {
        if !include_unknown && !is_known_table(&table.name, config) {
            warn!(table = %table.name, path = %table.path.display(), "unrecognized table ignored");
            ignored.push(table.path);
            continue;
        }
        tables.push(TableFrame::new(table.name, table.data).with_source(table.path));
    }
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(IngestResult { tables, ignored })
}

// ============================================================================
// Stage 2-3: Normalize and write cleaned tables
// ============================================================================

/// Normalize every table against the configured schemas.
pub fn normalize(tables: &mut [TableFrame], config: &PipelineConfig) -> Result<Vec<NormalizeReport>> {
    normalize_tables(tables, &config.tables).context("normalize tables")
}

/// Write each table to `<output>/csv_cleaned/<name>.csv`.
pub fn write_cleaned(output_dir: &Path, tables: &mut [TableFrame]) -> Result<Vec<PathBuf>> {
    let dir = ensure_output_dir(output_dir, CLEANED_DIR)?;
    tables
        .iter_mut()
        .map(|table| {
            write_csv_table(&dir, &table.name, &mut table.data).with_context(|| format!("write cleaned {}", table.name))
        })
        .collect()
}

// ============================================================================
// Stage 4-5: Build and write the main table
// ============================================================================

/// Join, enrich and evaluate the normalized tables.
pub fn build(tables: &[TableFrame], config: &PipelineConfig, clock: &dyn Clock) -> Result<ReferralView> {
    build_main_table(tables, &config.join_plan, clock).context("build main table")
}

/// Write the view to `<output>/csv_joined/main_table.csv`.
pub fn write_joined(output_dir: &Path, view: &mut ReferralView) -> Result<PathBuf> {
    let dir = ensure_output_dir(output_dir, JOINED_DIR)?;
    write_csv_table(&dir, JOINED_TABLE, &mut view.data).context("write main table")
}

/// Run every stage.
pub fn run(options: &RunOptions, clock: &dyn Clock) -> Result<RunResult> {
    let span = info_span!("run", input = %options.input_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let IngestResult { mut tables, ignored } = ingest(&options.input_dir, &options.config, options.include_unknown)?;
    info!(tables = tables.len(), ignored = ignored.len(), "ingest complete");

    let reports = normalize(&mut tables, &options.config)?;
    let cleaned = write_cleaned(&options.output_dir, &mut tables)?;

    let mut view = build(&tables, &options.config, clock)?;
    let joined = write_joined(&options.output_dir, &mut view)?;

    let summaries = reports
        .into_iter()
        .zip(cleaned)
        .map(|(report, output)| TableSummary {
            name: report.table,
            rows_in: report.rows_in,
            rows_out: report.rows_out,
            duplicates_dropped: report.duplicates_dropped,
            output,
        })
        .collect();

    info!(
        rows = view.rules.rows,
        valid = view.rules.valid,
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );

    Ok(RunResult {
        input_dir: options.input_dir.clone(),
        output_dir: options.output_dir.clone(),
        reference_time: view.rules.reference_time.to_rfc3339(),
        tables: summaries,
        ignored,
        main_table: MainTableSummary {
            rows: view.rules.rows,
            valid: view.rules.valid,
            invalid: view.rules.invalid,
            output: joined,
        },
    })
}
