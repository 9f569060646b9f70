//! # Record Model
//!
//! The typed shape of one latency observation from a ChatFlow load test and
//! the immutable dataset the analysis stages read from.
//!
//! A negative latency marks a message that was never acknowledged. Such
//! observations are excluded from latency statistics but still count as
//! traffic for the per-room, per-type and throughput breakdowns.

use serde::{Deserialize, Serialize};

/// One recorded message latency event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Send time in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    pub room_id: i32,
    /// Category such as `TEXT`, `JOIN` or `LEAVE`
    pub message_type: String,
    /// Send-to-ack latency in milliseconds, negative when the message failed
    pub latency_ms: f64,
}

impl Observation {
    pub fn new(
        timestamp_ms: i64,
        room_id: i32,
        message_type: impl Into<String>,
        latency_ms: f64,
    ) -> Self {
        Self {
            timestamp_ms,
            room_id,
            message_type: message_type.into(),
            latency_ms,
        }
    }

    /// Whether the message was acknowledged (`latency >= 0`)
    pub fn is_successful(&self) -> bool {
        self.latency_ms >= 0.0
    }
}

/// An ordered, read-only sequence of observations loaded for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn successful_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_successful()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.successful_count()
    }

    /// Earliest timestamp across all observations, failed ones included
    pub fn start_timestamp_ms(&self) -> Option<i64> {
        self.observations.iter().map(|o| o.timestamp_ms).min()
    }

    pub fn end_timestamp_ms(&self) -> Option<i64> {
        self.observations.iter().map(|o| o.timestamp_ms).max()
    }

    /// Wall-clock span between the first and last observation
    pub fn span_seconds(&self) -> f64 {
        match (self.start_timestamp_ms(), self.end_timestamp_ms()) {
            (Some(start), Some(end)) => (end - start) as f64 / 1000.0,
            _ => 0.0,
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_dataset(self)
    }
}

impl From<Vec<Observation>> for Dataset {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

/// Success/failure tally and overall rate for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate_percent: f64,
    pub span_seconds: f64,
    /// Total messages divided by the observed span; 0 when the span is empty
    pub overall_throughput_per_second: f64,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let total = dataset.len();
        let successful = dataset.successful_count();
        let span_seconds = dataset.span_seconds();

        let success_rate_percent = if total > 0 {
            100.0 * successful as f64 / total as f64
        } else {
            0.0
        };
        let overall_throughput_per_second = if span_seconds > 0.0 {
            total as f64 / span_seconds
        } else {
            0.0
        };

        Self {
            total,
            successful,
            failed: total - successful,
            success_rate_percent,
            span_seconds,
            overall_throughput_per_second,
        }
    }
}
