use anyhow::Result;
use chatflow_analyzer::{
    cli::Args, AnalysisConfig, AnalysisError, AnalysisRunner, GapPolicy, StatisticsOutcome,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_csv(rows: &[&str]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "timestamp,roomId,messageType,latency")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

fn runner_for(path: &Path, args: Args) -> Result<AnalysisRunner> {
    let args = Args {
        input: path.to_path_buf(),
        no_chart: true,
        ..args
    };
    Ok(AnalysisRunner::new(AnalysisConfig::from_args(&args)?))
}

/// Three observations across two buckets, one of them failed.
#[test]
fn two_bucket_run_from_csv() -> Result<()> {
    let file = write_csv(&["0,1,chat,10", "5000,1,chat,20", "12000,2,join,-1"])?;
    let results = runner_for(file.path(), Args::default())?.run()?;

    let stats = results.statistics.summary().expect("successful messages");
    assert_eq!(stats.count, 2);
    assert_eq!(stats.mean_ms, 15.0);
    assert_eq!(stats.median_ms, 15.0);
    assert!((stats.p95_ms - 19.5).abs() < 1e-9);
    assert_eq!(stats.min_ms, 10.0);
    assert_eq!(stats.max_ms, 20.0);

    let series = &results.throughput;
    assert_eq!(series.buckets.len(), 2);
    assert_eq!(series.buckets[0].message_count, 2);
    assert!((series.buckets[0].throughput_per_second - 0.2).abs() < 1e-12);
    assert_eq!(series.buckets[1].message_count, 1);
    assert!((series.buckets[1].throughput_per_second - 0.1).abs() < 1e-12);
    assert_eq!(series.peak.as_ref().map(|p| p.bucket_index), Some(0));
    assert!((series.average_throughput_per_second - 0.15).abs() < 1e-12);

    assert_eq!(results.metadata.input.as_deref(), Some(file.path()));
    Ok(())
}

/// Every message failed: statistics report no data, other sections populate.
#[test]
fn all_failed_messages() -> Result<()> {
    let file = write_csv(&["0,1,TEXT,-1", "3000,2,JOIN,-1", "14000,2,TEXT,-1"])?;
    let results = runner_for(file.path(), Args::default())?.run()?;

    assert_eq!(results.statistics, StatisticsOutcome::NoSuccessfulMessages);
    assert_eq!(results.rooms.iter().map(|c| c.count).sum::<usize>(), 3);
    assert_eq!(results.message_types[0].key, "TEXT");
    assert_eq!(results.message_types[0].count, 2);
    assert_eq!(results.throughput.total_messages(), 3);
    assert_eq!(results.dataset.failed, 3);
    Ok(())
}

/// A single observation yields exactly one bucket which is also the peak.
#[test]
fn single_observation() -> Result<()> {
    let file = write_csv(&["1700000000000,5,TEXT,3.5"])?;
    let results = runner_for(file.path(), Args::default())?.run()?;

    let series = &results.throughput;
    assert_eq!(series.buckets.len(), 1);
    assert_eq!(series.peak.as_ref(), Some(&series.buckets[0]));
    assert_eq!(
        series.average_throughput_per_second,
        series.buckets[0].throughput_per_second
    );
    Ok(())
}

/// Per-room counts agree with an independent tally of the input rows.
#[test]
fn room_counts_match_reference_tally() -> Result<()> {
    let rows: Vec<String> = (0..240)
        .map(|i| {
            let room = (i * 7) % 20 + 1;
            let kind = ["TEXT", "TEXT", "TEXT", "JOIN", "LEAVE"][i % 5];
            let latency = if i % 11 == 0 { -1.0 } else { (i % 37) as f64 * 1.5 };
            format!("{},{},{},{}", 1_700_000_000_000u64 + i as u64 * 450, room, kind, latency)
        })
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let file = write_csv(&refs)?;

    let mut tally: HashMap<i32, usize> = HashMap::new();
    for i in 0..240 {
        *tally.entry(((i * 7) % 20 + 1) as i32).or_default() += 1;
    }

    let results = runner_for(file.path(), Args::default())?.run()?;
    assert_eq!(results.rooms.len(), tally.len());
    for room in &results.rooms {
        assert_eq!(room.count, tally[&room.key]);
    }
    assert!(results.rooms.windows(2).all(|w| w[0].key < w[1].key));
    assert!(results
        .message_types
        .windows(2)
        .all(|w| w[0].count >= w[1].count));
    assert_eq!(results.throughput.total_messages(), 240);

    let stats = results.statistics.summary().expect("successful messages");
    assert!(stats.min_ms <= stats.median_ms);
    assert!(stats.median_ms <= stats.p95_ms);
    assert!(stats.p95_ms <= stats.p99_ms);
    assert!(stats.p99_ms <= stats.max_ms);
    Ok(())
}

/// Idle intervals are skipped by default and zero-filled on request.
#[test]
fn gap_policy_changes_average() -> Result<()> {
    let file = write_csv(&["0,1,TEXT,1", "1000,1,TEXT,1", "45000,1,TEXT,1"])?;

    let skipped = runner_for(file.path(), Args::default())?.run()?;
    assert_eq!(skipped.throughput.gap_policy, GapPolicy::Skip);
    assert_eq!(skipped.throughput.buckets.len(), 2);

    let filled = runner_for(
        file.path(),
        Args {
            fill_gaps: true,
            ..Default::default()
        },
    )?
    .run()?;
    assert_eq!(filled.throughput.buckets.len(), 5);
    assert!(
        filled.throughput.average_throughput_per_second
            < skipped.throughput.average_throughput_per_second
    );
    assert_eq!(filled.throughput.total_messages(), 3);
    Ok(())
}

/// A bucket width far too small for the run fails instead of filling memory.
#[test]
fn oversized_bucket_span_is_rejected() -> Result<()> {
    let file = write_csv(&["0,1,TEXT,1", "3600000,1,TEXT,1"])?;
    let args = Args {
        bucket_width: 0.000001,
        fill_gaps: true,
        ..Default::default()
    };

    let err = runner_for(file.path(), args)?.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::TooManyBuckets { .. })
    ));
    Ok(())
}

/// Structural problems in the input abort the run.
#[test]
fn malformed_input_is_fatal() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "timestamp,roomId,latency")?;
    writeln!(file, "0,1,10")?;
    file.flush()?;

    let err = runner_for(file.path(), Args::default())?.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::MissingColumn("messageType"))
    ));

    let bad_row = write_csv(&["0,1,TEXT,10", "abc,1,TEXT,10"])?;
    let err = runner_for(bad_row.path(), Args::default())?.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InvalidRow { line: 3, .. })
    ));
    Ok(())
}

/// Header-only input is valid and produces empty sections.
#[test]
fn empty_dataset_degrades_gracefully() -> Result<()> {
    let file = write_csv(&[])?;
    let results = runner_for(file.path(), Args::default())?.run()?;

    assert_eq!(results.dataset.total, 0);
    assert_eq!(results.statistics, StatisticsOutcome::NoSuccessfulMessages);
    assert!(results.rooms.is_empty());
    assert!(results.throughput.is_empty());
    assert!(results.throughput.peak.is_none());
    Ok(())
}
