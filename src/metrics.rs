use crate::record::{Dataset, Observation};
use serde::{Deserialize, Serialize};

/// Latency statistics over the successful subset of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStatistics {
    pub count: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of the statistics stage
///
/// An empty filtered subset is reported explicitly instead of producing
/// NaN-valued fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatisticsOutcome {
    Summary(LatencyStatistics),
    NoSuccessfulMessages,
}

impl StatisticsOutcome {
    pub fn summary(&self) -> Option<&LatencyStatistics> {
        match self {
            StatisticsOutcome::Summary(stats) => Some(stats),
            StatisticsOutcome::NoSuccessfulMessages => None,
        }
    }
}

/// Compute latency statistics over the observations selected by `filter`
pub fn compute_statistics<F>(observations: &[Observation], filter: F) -> StatisticsOutcome
where
    F: Fn(&Observation) -> bool,
{
    let mut latencies: Vec<f64> = observations
        .iter()
        .filter(|&o| filter(o))
        .map(|o| o.latency_ms)
        .collect();

    if latencies.is_empty() {
        return StatisticsOutcome::NoSuccessfulMessages;
    }

    latencies.sort_by(f64::total_cmp);
    let count = latencies.len();
    let mean_ms = latencies.iter().sum::<f64>() / count as f64;

    StatisticsOutcome::Summary(LatencyStatistics {
        count,
        mean_ms,
        median_ms: median(&latencies),
        p95_ms: percentile(&latencies, 0.95),
        p99_ms: percentile(&latencies, 0.99),
        min_ms: latencies[0],
        max_ms: latencies[count - 1],
    })
}

/// Statistics over acknowledged messages only (`latency >= 0`)
pub fn compute_latency_statistics(dataset: &Dataset) -> StatisticsOutcome {
    compute_statistics(dataset.observations(), Observation::is_successful)
}

/// Linearly interpolated quantile of an ascending slice, `q` in `[0, 1]`
///
/// The fractional index `q * (n - 1)` is split into floor and ceil neighbours
/// and the remainder weights the step between them. Returns 0 for an empty
/// slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let index = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}

/// Middle element, or the mean of the two middle elements for even lengths
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
