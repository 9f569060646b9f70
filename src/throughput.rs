//! # Time-Bucketing Engine
//!
//! Splits the run into fixed-width intervals measured from the earliest
//! observation and reports how many messages fell into each one. All traffic
//! counts, including failed messages.
//!
//! ## Bucketing
//!
//! ```text
//! start      = min(timestamp)
//! elapsed_s  = (timestamp - start) / 1000
//! index      = floor(elapsed_s / width_s)
//! throughput = count / width_s
//! ```
//!
//! By default only populated buckets are emitted ([`GapPolicy::Skip`]), so an
//! idle interval neither appears in the series nor lowers the average.
//! [`GapPolicy::FillZero`] emits zero-count buckets for those intervals.
//!
//! A run may span at most [`MAX_BUCKETS`] buckets under either policy. Wider
//! spans fail with [`AnalysisError::TooManyBuckets`] before any bucket is built.

use crate::error::AnalysisError;
use crate::record::{Dataset, Observation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Upper bound on `last bucket index + 1` for one series
pub const MAX_BUCKETS: u64 = 1_000_000;

/// A validated, strictly positive bucket width in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BucketWidth(f64);

impl BucketWidth {
    pub fn new(seconds: f64) -> Result<Self, AnalysisError> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(AnalysisError::InvalidBucketWidth(seconds))
        }
    }

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self(crate::defaults::BUCKET_WIDTH_SECS)
    }
}

/// How intervals without any traffic are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Emit populated buckets only
    #[default]
    Skip,
    /// Emit a zero-count bucket for every empty index between the first and
    /// last populated bucket
    FillZero,
}

/// Traffic observed in one time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputBucket {
    pub bucket_index: u64,
    /// Offset of the bucket start from the first observation
    pub start_seconds: f64,
    pub message_count: usize,
    pub throughput_per_second: f64,
}

/// Bucketed throughput for a whole run, ascending by bucket index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSeries {
    pub bucket_width_seconds: f64,
    pub gap_policy: GapPolicy,
    pub buckets: Vec<ThroughputBucket>,
    /// Highest-throughput bucket, earliest one on ties
    pub peak: Option<ThroughputBucket>,
    /// Mean throughput over the emitted buckets
    pub average_throughput_per_second: f64,
}

impl ThroughputSeries {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_messages(&self) -> usize {
        self.buckets.iter().map(|b| b.message_count).sum()
    }

    pub fn max_throughput(&self) -> f64 {
        self.peak
            .as_ref()
            .map(|p| p.throughput_per_second)
            .unwrap_or(0.0)
    }

    /// Seconds covered from the first bucket start to the last bucket end
    pub fn covered_seconds(&self) -> f64 {
        self.buckets
            .last()
            .map(|b| b.start_seconds + self.bucket_width_seconds)
            .unwrap_or(0.0)
    }
}

/// Bucket observations by time and derive the throughput series
pub fn bucket_throughput(
    observations: &[Observation],
    width: BucketWidth,
    gaps: GapPolicy,
) -> Result<ThroughputSeries, AnalysisError> {
    let width_s = width.seconds();

    let Some(start_ms) = observations.iter().map(|o| o.timestamp_ms).min() else {
        return Ok(ThroughputSeries {
            bucket_width_seconds: width_s,
            gap_policy: gaps,
            buckets: Vec::new(),
            peak: None,
            average_throughput_per_second: 0.0,
        });
    };
    let end_ms = observations
        .iter()
        .map(|o| o.timestamp_ms)
        .max()
        .unwrap_or(start_ms);

    let span_seconds = end_ms.abs_diff(start_ms) as f64 / 1000.0;
    let last_index = (span_seconds / width_s).floor();
    // Also rejects an infinite quotient, so the casts below never saturate.
    if !(last_index < MAX_BUCKETS as f64) {
        return Err(AnalysisError::TooManyBuckets {
            span_seconds,
            width_seconds: width_s,
            limit: MAX_BUCKETS,
        });
    }

    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for observation in observations {
        let elapsed_s = observation.timestamp_ms.abs_diff(start_ms) as f64 / 1000.0;
        let index = (elapsed_s / width_s).floor() as u64;
        *counts.entry(index).or_default() += 1;
    }

    if gaps == GapPolicy::FillZero {
        if let Some(&last) = counts.keys().next_back() {
            for index in 0..=last {
                counts.entry(index).or_insert(0);
            }
        }
    }

    let buckets: Vec<ThroughputBucket> = counts
        .into_iter()
        .map(|(bucket_index, message_count)| ThroughputBucket {
            bucket_index,
            start_seconds: bucket_index as f64 * width_s,
            message_count,
            throughput_per_second: message_count as f64 / width_s,
        })
        .collect();

    let peak = find_peak(&buckets).cloned();
    let average_throughput_per_second =
        buckets.iter().map(|b| b.throughput_per_second).sum::<f64>() / buckets.len() as f64;

    debug!(
        "Bucketed {} observations into {} buckets of {}s",
        observations.len(),
        buckets.len(),
        width_s
    );

    Ok(ThroughputSeries {
        bucket_width_seconds: width_s,
        gap_policy: gaps,
        buckets,
        peak,
        average_throughput_per_second,
    })
}

/// Convenience wrapper over a whole dataset
pub fn bucket_dataset(
    dataset: &Dataset,
    width: BucketWidth,
    gaps: GapPolicy,
) -> Result<ThroughputSeries, AnalysisError> {
    bucket_throughput(dataset.observations(), width, gaps)
}

/// First bucket holding the maximum throughput
fn find_peak(buckets: &[ThroughputBucket]) -> Option<&ThroughputBucket> {
    let mut peak: Option<&ThroughputBucket> = None;
    for bucket in buckets {
        match peak {
            Some(current) if bucket.throughput_per_second <= current.throughput_per_second => {}
            _ => peak = Some(bucket),
        }
    }
    peak
}
