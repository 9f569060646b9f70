use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a stage of the analysis.
///
/// Load errors are fatal to the whole run. `InvalidBucketWidth` and
/// `TooManyBuckets` are raised before bucketing starts and only concern the
/// throughput stage.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to open latency log at '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("required column '{0}' is missing from the CSV header")]
    MissingColumn(&'static str),

    #[error("malformed row at line {line}: {source}")]
    InvalidRow {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row at line {line}: latency '{value}' is not a finite number")]
    NonFiniteLatency { line: u64, value: f64 },

    #[error("row at line {line}: messageType is empty")]
    EmptyMessageType { line: u64 },

    #[error("bucket width must be a positive number of seconds, got {0}")]
    InvalidBucketWidth(f64),

    #[error(
        "a {span_seconds}s run split into {width_seconds}s buckets needs more than {limit} buckets"
    )]
    TooManyBuckets {
        span_seconds: f64,
        width_seconds: f64,
        limit: u64,
    },
}
