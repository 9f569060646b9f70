use clap::Parser;
use std::path::PathBuf;

/// ChatFlow Latency Analyzer - statistics, breakdowns and throughput charts
/// for load-test latency logs
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Latency log to analyze (CSV with timestamp, roomId, messageType, latency)
    #[clap(short = 'i', long, default_value = crate::defaults::INPUT_FILE)]
    pub input: PathBuf,

    /// Width of each throughput bucket in seconds
    #[clap(short = 'b', long, default_value_t = crate::defaults::BUCKET_WIDTH_SECS, allow_negative_numbers = true)]
    pub bucket_width: f64,

    /// Directory for the chart files
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Base file name for the chart files (extensions are added)
    #[clap(long, default_value = crate::defaults::CHART_BASENAME)]
    pub chart_name: String,

    /// Also write the full results as JSON to this file
    #[clap(long)]
    pub json_output: Option<PathBuf>,

    /// Emit zero-count buckets for idle intervals instead of skipping them
    #[clap(long, default_value_t = false)]
    pub fill_gaps: bool,

    /// Skip chart rendering
    #[clap(long, default_value_t = false)]
    pub no_chart: bool,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: PathBuf::from(crate::defaults::INPUT_FILE),
            bucket_width: crate::defaults::BUCKET_WIDTH_SECS,
            output_dir: PathBuf::from(crate::defaults::OUTPUT_DIR),
            chart_name: crate::defaults::CHART_BASENAME.to_string(),
            json_output: None,
            fill_gaps: false,
            no_chart: false,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_match_default_impl() {
        let args = Args::try_parse_from(["chatflow-analyzer"]).unwrap();
        let default = Args::default();

        assert_eq!(args.input, default.input);
        assert_eq!(args.bucket_width, default.bucket_width);
        assert_eq!(args.output_dir, default.output_dir);
        assert_eq!(args.chart_name, default.chart_name);
        assert!(args.json_output.is_none());
        assert!(!args.fill_gaps);
        assert!(!args.no_chart);
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "chatflow-analyzer",
            "-i",
            "results/latency.csv",
            "--bucket-width",
            "5",
            "--fill-gaps",
            "--json-output",
            "summary.json",
            "-o",
            "charts",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("results/latency.csv"));
        assert_eq!(args.bucket_width, 5.0);
        assert!(args.fill_gaps);
        assert_eq!(args.json_output, Some(PathBuf::from("summary.json")));
        assert_eq!(args.output_dir, PathBuf::from("charts"));
    }

    #[test]
    fn test_negative_bucket_width_parses_for_later_validation() {
        let args = Args::try_parse_from(["chatflow-analyzer", "-b", "-1"]).unwrap();
        assert_eq!(args.bucket_width, -1.0);
    }

    #[test]
    fn test_rejects_non_numeric_bucket_width() {
        assert!(Args::try_parse_from(["chatflow-analyzer", "-b", "ten"]).is_err());
    }
}
