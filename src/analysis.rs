//! # Analysis Driver
//!
//! Sequences one analysis run over a single latency log:
//!
//! 1. **Load**: parse and validate the CSV into a [`Dataset`]
//! 2. **Statistics**: latency summary over successful messages
//! 3. **Breakdowns**: message counts per room and per message type
//! 4. **Throughput**: time-bucketed series with peak and average
//!
//! The runner holds no state between runs. Loading failures abort the run,
//! as does a bucket width too small for the span of the run. An empty
//! successful subset or an empty dataset still yields a complete
//! [`AnalysisResults`] with empty sections.

use crate::{
    aggregate::{message_type_breakdown, room_breakdown},
    cli::Args,
    error::AnalysisError,
    loader::load_dataset,
    metrics::compute_latency_statistics,
    record::Dataset,
    results::{AnalysisMetadata, AnalysisResults},
    throughput::{bucket_dataset, BucketWidth, GapPolicy},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub bucket_width: BucketWidth,
    pub gap_policy: GapPolicy,
    /// Directory receiving the chart files
    pub output_dir: PathBuf,
    pub chart_basename: String,
    pub render_chart: bool,
    pub json_output: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(crate::defaults::INPUT_FILE),
            bucket_width: BucketWidth::default(),
            gap_policy: GapPolicy::Skip,
            output_dir: PathBuf::from(crate::defaults::OUTPUT_DIR),
            chart_basename: crate::defaults::CHART_BASENAME.to_string(),
            render_chart: true,
            json_output: None,
        }
    }
}

impl AnalysisConfig {
    /// Build a configuration from parsed arguments
    ///
    /// The bucket width is validated here, before any data is read.
    pub fn from_args(args: &Args) -> Result<Self> {
        let bucket_width = BucketWidth::new(args.bucket_width)
            .context("invalid --bucket-width")?;

        let chart_basename = args.chart_name.trim();
        if chart_basename.is_empty() {
            anyhow::bail!("--chart-name cannot be empty");
        }

        Ok(Self {
            input: args.input.clone(),
            bucket_width,
            gap_policy: if args.fill_gaps {
                GapPolicy::FillZero
            } else {
                GapPolicy::Skip
            },
            output_dir: args.output_dir.clone(),
            chart_basename: chart_basename.to_string(),
            render_chart: !args.no_chart,
            json_output: args.json_output.clone(),
        })
    }
}

/// Runs the analysis stages over one dataset
pub struct AnalysisRunner {
    config: AnalysisConfig,
}

impl AnalysisRunner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured input and analyze it
    pub fn run(&self) -> Result<AnalysisResults> {
        let dataset = load_dataset(&self.config.input)
            .with_context(|| format!("could not load {}", self.config.input.display()))?;

        let mut results = self.analyze(&dataset)?;
        results.metadata.input = Some(self.config.input.clone());
        Ok(results)
    }

    /// Analyze an in-memory dataset
    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisResults, AnalysisError> {
        if dataset.is_empty() {
            warn!("Dataset is empty; all sections will be empty");
        }

        let statistics = compute_latency_statistics(dataset);
        if statistics.summary().is_none() {
            warn!("No successful messages to analyze");
        }

        let rooms = room_breakdown(dataset);
        let message_types = message_type_breakdown(dataset);
        debug!(
            "Aggregated {} rooms and {} message types",
            rooms.len(),
            message_types.len()
        );

        let throughput =
            bucket_dataset(dataset, self.config.bucket_width, self.config.gap_policy)?;
        if let Some(ref peak) = throughput.peak {
            info!(
                "Peak throughput {:.2} msg/s in bucket {} ({} buckets)",
                peak.throughput_per_second,
                peak.bucket_index,
                throughput.buckets.len()
            );
        }

        Ok(AnalysisResults {
            metadata: AnalysisMetadata {
                version: crate::VERSION.to_string(),
                generated_at: chrono::Utc::now(),
                input: None,
                bucket_width_seconds: self.config.bucket_width.seconds(),
                gap_policy: self.config.gap_policy,
            },
            dataset: dataset.summary(),
            statistics,
            rooms,
            message_types,
            throughput,
        })
    }
}
