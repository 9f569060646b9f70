use anyhow::Result;
use chatflow_analyzer::{cli::Args, AnalysisConfig, AnalysisRunner, ResultsManager};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Full run: CSV in, PNG + SVG chart and JSON summary out.
#[test]
fn exports_charts_and_json() -> Result<()> {
    let mut csv = NamedTempFile::new()?;
    writeln!(csv, "timestamp,messageType,latency,statusCode,roomId")?;
    for i in 0..120u64 {
        let latency = if i % 10 == 9 { -1 } else { (i % 13) as i64 + 2 };
        let status = if latency < 0 { "FAIL" } else { "OK" };
        let kind = if i % 4 == 0 { "JOIN" } else { "TEXT" };
        writeln!(csv, "{},{},{},{},{}", 1_700_000_000_000 + i * 800, kind, latency, status, i % 3 + 1)?;
    }
    csv.flush()?;

    let out = tempdir()?;
    let json = out.path().join("analysis.json");
    let args = Args {
        input: csv.path().to_path_buf(),
        output_dir: out.path().to_path_buf(),
        json_output: Some(json.clone()),
        bucket_width: 15.0,
        ..Default::default()
    };

    let config = AnalysisConfig::from_args(&args)?;
    let runner = AnalysisRunner::new(config);
    let results = runner.run()?;
    let artifacts = ResultsManager::from_config(runner.config()).finalize(&results)?;

    let png = out.path().join("throughput_chart.png");
    let svg = out.path().join("throughput_chart.svg");
    assert_eq!(artifacts.charts, vec![png.clone(), svg.clone()]);
    assert_eq!(&std::fs::read(&png)?[..4], b"\x89PNG");

    let svg_text = std::fs::read_to_string(&svg)?;
    assert!(svg_text.contains("Throughput Over Time (15s buckets)"));
    assert!(svg_text.contains("Peak:"));
    assert!(svg_text.contains("Average:"));

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json)?)?;
    assert_eq!(value["dataset"]["total"], 120);
    assert_eq!(value["dataset"]["failed"], 12);
    assert_eq!(value["metadata"]["bucket_width_seconds"], 15.0);
    assert_eq!(value["message_types"][0]["key"], "TEXT");
    assert_eq!(value["message_types"][0]["count"], 90);
    Ok(())
}
