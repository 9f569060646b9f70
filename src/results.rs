use crate::{
    aggregate::CategoryCount,
    analysis::AnalysisConfig,
    chart::ThroughputChart,
    metrics::StatisticsOutcome,
    record::DatasetSummary,
    throughput::{GapPolicy, ThroughputSeries},
    utils::{banner, format_count, format_decimal, format_seconds},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Every derived value produced by one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub metadata: AnalysisMetadata,
    pub dataset: DatasetSummary,
    pub statistics: StatisticsOutcome,
    pub rooms: Vec<CategoryCount<i32>>,
    pub message_types: Vec<CategoryCount<String>>,
    pub throughput: ThroughputSeries,
}

/// Provenance of a results bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub version: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub input: Option<PathBuf>,
    pub bucket_width_seconds: f64,
    pub gap_policy: GapPolicy,
}

/// Paths written by [`ResultsManager::finalize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportArtifacts {
    pub charts: Vec<PathBuf>,
    pub json: Option<PathBuf>,
}

/// Hands results to the console, JSON and chart outputs
pub struct ResultsManager {
    output_dir: PathBuf,
    chart_basename: String,
    render_chart: bool,
    json_output: Option<PathBuf>,
}

impl ResultsManager {
    pub fn new<P: AsRef<Path>>(output_dir: P, chart_basename: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            chart_basename: chart_basename.into(),
            render_chart: true,
            json_output: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut manager = Self::new(&config.output_dir, config.chart_basename.clone());
        manager.render_chart = config.render_chart;
        manager.json_output = config.json_output.clone();
        manager
    }

    /// Also export the results as pretty-printed JSON
    pub fn enable_json<P: AsRef<Path>>(&mut self, path: P) {
        self.json_output = Some(path.as_ref().to_path_buf());
    }

    pub fn disable_chart(&mut self) {
        self.render_chart = false;
    }

    /// Print the console report, then write the chart and JSON artifacts
    pub fn finalize(&self, results: &AnalysisResults) -> Result<ReportArtifacts> {
        print!("{}", render_console_report(results));

        let mut artifacts = ReportArtifacts::default();

        if self.render_chart {
            let chart = ThroughputChart::with_defaults(&results.throughput);
            artifacts.charts = chart.save_all(&self.output_dir, &self.chart_basename)?;
            print!("{}", render_chart_summary(results, &artifacts.charts));
        }

        if let Some(ref path) = self.json_output {
            self.write_json(results, path)?;
            artifacts.json = Some(path.clone());
        }

        println!("{}", banner(crate::defaults::BANNER_WIDTH));
        println!("  ANALYSIS COMPLETE");
        println!("{}", banner(crate::defaults::BANNER_WIDTH));
        Ok(artifacts)
    }

    fn write_json(&self, results: &AnalysisResults, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write JSON results to {}", path.display()))?;
        info!("Results written to: {}", path.display());
        Ok(())
    }
}

/// Banner-delimited console report for statistics, rooms and message types
pub fn render_console_report(results: &AnalysisResults) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_console_report(&mut out, results);
    out
}

fn write_console_report(out: &mut String, results: &AnalysisResults) -> std::fmt::Result {
    let line = banner(crate::defaults::BANNER_WIDTH);

    writeln!(out)?;
    section_header(out, &line, "CHATFLOW LATENCY ANALYSIS")?;
    writeln!(out)?;

    let d = &results.dataset;
    section_header(out, &line, "DATASET SUMMARY")?;
    writeln!(out, "  Total messages     : {}", format_count(d.total))?;
    writeln!(out, "  Successful         : {}", format_count(d.successful))?;
    writeln!(out, "  Failed             : {}", format_count(d.failed))?;
    writeln!(out, "  Success rate       : {:.1}%", d.success_rate_percent)?;
    writeln!(out, "  Wall time          : {:.3} s", d.span_seconds)?;
    writeln!(
        out,
        "  Overall throughput : {} msg/s",
        format_decimal(d.overall_throughput_per_second, 2)
    )?;
    writeln!(out, "{line}\n")?;

    match &results.statistics {
        StatisticsOutcome::Summary(s) => {
            section_header(out, &line, "LATENCY STATISTICS")?;
            writeln!(out, "  Total records      : {}", format_count(s.count))?;
            writeln!(out, "  Mean response time : {:.2} ms", s.mean_ms)?;
            writeln!(out, "  Median             : {:.2} ms", s.median_ms)?;
            writeln!(out, "  95th percentile    : {:.2} ms", s.p95_ms)?;
            writeln!(out, "  99th percentile    : {:.2} ms", s.p99_ms)?;
            writeln!(out, "  Min                : {:.2} ms", s.min_ms)?;
            writeln!(out, "  Max                : {:.2} ms", s.max_ms)?;
            writeln!(out, "{line}\n")?;
        }
        StatisticsOutcome::NoSuccessfulMessages => {
            writeln!(out, "No successful messages to analyze.\n")?;
        }
    }

    section_header(out, &line, "THROUGHPUT PER ROOM")?;
    for room in &results.rooms {
        writeln!(out, "  Room {:2} : {} messages", room.key, format_count(room.count))?;
    }
    writeln!(out, "{line}\n")?;

    section_header(out, &line, "MESSAGE TYPE DISTRIBUTION")?;
    for kind in &results.message_types {
        writeln!(
            out,
            "  {:6} : {} ({:.1}%)",
            kind.key,
            format_count(kind.count),
            kind.percentage_of(d.total)
        )?;
    }
    writeln!(out, "{line}\n")?;

    Ok(())
}

fn section_header(out: &mut String, line: &str, title: &str) -> std::fmt::Result {
    writeln!(out, "{line}")?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{line}")
}

/// Peak and average lines printed after the chart is written
pub fn render_chart_summary(results: &AnalysisResults, charts: &[PathBuf]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_chart_summary(&mut out, &results.throughput, charts);
    debug!(
        "Rendered chart summary for {} buckets",
        results.throughput.buckets.len()
    );
    out
}

fn write_chart_summary(
    out: &mut String,
    series: &ThroughputSeries,
    charts: &[PathBuf],
) -> std::fmt::Result {
    writeln!(
        out,
        "Generated throughput chart (bucket size: {}s)",
        format_seconds(series.bucket_width_seconds)
    )?;
    if !charts.is_empty() {
        let names: Vec<String> = charts.iter().map(|p| p.display().to_string()).collect();
        writeln!(out, "Charts saved: {}", names.join(", "))?;
    }
    match &series.peak {
        Some(peak) => writeln!(
            out,
            "  Peak throughput: {} msg/s at {:.0}s",
            format_decimal(peak.throughput_per_second, 2),
            peak.start_seconds
        )?,
        None => writeln!(out, "  Peak throughput: n/a (no messages)")?,
    }
    writeln!(
        out,
        "  Avg throughput:  {} msg/s\n",
        format_decimal(series.average_throughput_per_second, 2)
    )
}
