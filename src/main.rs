//! # ChatFlow Latency Analyzer - Main Entry Point
//!
//! One-shot batch analysis of a load-test latency log:
//! 1. **Initialize logging**: colorized tracing output on stderr
//! 2. **Parse arguments**: input path, bucket width and output options
//! 3. **Create analysis config**: validates the bucket width up front
//! 4. **Run analysis**: load the CSV and compute every section
//! 5. **Output**: console report, throughput charts, optional JSON
//!
//! Any failure aborts the run with a non-zero exit code; no partial report
//! is written.

use anyhow::Result;
use chatflow_analyzer::{
    analysis::{AnalysisConfig, AnalysisRunner},
    cli::Args,
    logging,
    results::ResultsManager,
};
use clap::Parser;
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the level selected by --verbose
    logging::init(args.verbose);

    info!("Starting ChatFlow latency analysis");
    debug!("Configuration: {:?}", args);

    let config = AnalysisConfig::from_args(&args)?;
    let runner = AnalysisRunner::new(config);
    let results = runner.run()?;

    let results_manager = ResultsManager::from_config(runner.config());
    let artifacts = results_manager.finalize(&results)?;
    debug!("Artifacts: {:?}", artifacts);

    info!("Analysis completed successfully");
    Ok(())
}
