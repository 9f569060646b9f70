//! # ChatFlow Latency Analyzer Library
//!
//! Turns the per-message latency log of a ChatFlow load test into summary
//! statistics, per-room and per-type breakdowns and a time-bucketed
//! throughput chart.
//!
//! ## Input
//!
//! A CSV file with one row per message and at least these columns:
//!
//! | Column        | Type    | Meaning                                   |
//! |---------------|---------|-------------------------------------------|
//! | `timestamp`   | integer | send time, milliseconds since the epoch   |
//! | `roomId`      | integer | chat room the message was sent to         |
//! | `messageType` | string  | `TEXT`, `JOIN`, `LEAVE`, ...              |
//! | `latency`     | float   | send-to-ack milliseconds, negative = fail |
//!
//! ## Architecture Overview
//!
//! - `record`: observation and dataset types
//! - `loader`: CSV parsing with an explicit schema
//! - `metrics`: latency statistics with interpolated percentiles
//! - `aggregate`: group-by-key counting for rooms and message types
//! - `throughput`: fixed-width time bucketing, peak and average detection
//! - `chart`: PNG and SVG rendering of the throughput series
//! - `analysis`: the driver sequencing all stages for one dataset
//! - `results`: console report and JSON export
//!
//! ## Usage Example
//!
//! ```rust
//! use chatflow_analyzer::{AnalysisConfig, AnalysisRunner, Dataset, Observation};
//!
//! let dataset = Dataset::new(vec![
//!     Observation::new(0, 1, "chat", 10.0),
//!     Observation::new(5_000, 1, "chat", 20.0),
//!     Observation::new(12_000, 2, "join", -1.0),
//! ]);
//!
//! let results = AnalysisRunner::new(AnalysisConfig::default()).analyze(&dataset)?;
//! assert_eq!(results.throughput.buckets.len(), 2);
//! assert_eq!(results.statistics.summary().unwrap().median_ms, 15.0);
//! # Ok::<(), chatflow_analyzer::AnalysisError>(())
//! ```

pub mod aggregate;

/// Report driver
///
/// Holds `AnalysisConfig` and `AnalysisRunner`, which load one latency log
/// and run every analysis stage over it.
pub mod analysis;

pub mod chart;

/// Command-line interface
///
/// Argument parsing using clap. `AnalysisConfig::from_args` turns the parsed
/// arguments into a validated configuration.
pub mod cli;

pub mod error;
pub mod loader;
pub mod logging;

/// Latency statistics
///
/// Mean, median and linearly interpolated p95/p99 over successful messages.
pub mod metrics;

pub mod record;
pub mod results;
pub mod throughput;
pub mod utils;

pub use aggregate::{aggregate_by, CategoryCount, CountOrder};
pub use analysis::{AnalysisConfig, AnalysisRunner};
pub use chart::{ChartOptions, ThroughputChart};
pub use cli::Args;
pub use error::AnalysisError;
pub use loader::{load_dataset, read_dataset};
pub use metrics::{compute_statistics, LatencyStatistics, StatisticsOutcome};
pub use record::{Dataset, DatasetSummary, Observation};
pub use results::{AnalysisResults, ResultsManager};
pub use throughput::{bucket_throughput, BucketWidth, GapPolicy, ThroughputBucket, ThroughputSeries};

/// The current version of the analyzer, recorded in exported results
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Latency log written by the load-test client
    pub const INPUT_FILE: &str = "latency.csv";

    /// Throughput bucket width in seconds
    pub const BUCKET_WIDTH_SECS: f64 = 10.0;

    /// Directory for chart files
    pub const OUTPUT_DIR: &str = ".";

    /// Chart file name without extension
    pub const CHART_BASENAME: &str = "throughput_chart";

    /// Width of the `=` banners delimiting console report sections
    pub const BANNER_WIDTH: usize = 50;
}
