use std::env;

use anyhow::{Context, Result};
use tracing::info;

use referral_cli::pipeline::{RunOptions, run};
use referral_cli::summary::print_tables;
use referral_cli::types::RunResult;
use referral_model::PipelineConfig;
use referral_transform::{Clock, FixedClock, SystemClock};

use crate::cli::{RunArgs, TablesArgs};

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let config = PipelineConfig::load_or_default(args.config.as_deref()).context("load pipeline config")?;
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("resolve current directory")?,
    };
    let options = RunOptions {
        input_dir: args.input_dir.clone(),
        output_dir,
        config,
        include_unknown: args.include_unknown,
    };
    let clock: Box<dyn Clock> = match args.now {
        Some(instant) => {
            info!(reference = %instant.to_rfc3339(), "using pinned reference time");
            Box::new(FixedClock::new(instant))
        }
        None => Box::new(SystemClock),
    };
    run(&options, clock.as_ref())
}

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let config = PipelineConfig::load_or_default(args.config.as_deref()).context("load pipeline config")?;
    print_tables(&config);
    Ok(())
}
