//! CLI argument definitions for the referral pipeline.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "referral",
    version,
    about = "Referral reward pipeline - clean, join and validate referral data",
    long_about = "Clean referral source tables, join them into one referral view and \
                  flag each referral reward as valid or invalid.\n\n\
                  Writes <OUTPUT>/csv_cleaned/<table>.csv and \
                  <OUTPUT>/csv_joined/main_table.csv."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline on a directory of CSV files.
    Run(RunArgs),

    /// List the known tables with their schema and join key.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory containing <table>.csv source files.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// JSON file overriding table schemas and the join plan.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reference time for membership checks, RFC 3339 (default: now).
    #[arg(long = "now", value_name = "RFC3339", value_parser = parse_reference_time)]
    pub now: Option<DateTime<FixedOffset>>,

    /// Also clean CSV files whose names are not known tables.
    #[arg(long = "include-unknown")]
    pub include_unknown: bool,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// JSON file overriding table schemas and the join plan.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_reference_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
