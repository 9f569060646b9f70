//! # Latency Log Loader
//!
//! Reads the per-message CSV written by the load-test client into a
//! [`Dataset`]. The schema is explicit: four typed columns must be present in
//! the header and every row must parse into them, otherwise loading fails
//! with the offending line number. Nothing is inferred and no NaN values are
//! allowed through.
//!
//! Column order does not matter and unknown columns (such as `statusCode`)
//! are ignored.

use crate::error::AnalysisError;
use crate::record::{Dataset, Observation};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Header names every latency log must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["timestamp", "roomId", "messageType", "latency"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatencyRow {
    timestamp: i64,
    room_id: i32,
    message_type: String,
    latency: f64,
}

/// Load a dataset from a CSV file on disk
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, AnalysisError> {
    let path = path.as_ref();
    info!("Loading data from {}...", path.display());

    let reader = builder()
        .from_path(path)
        .map_err(|source| AnalysisError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let dataset = parse(reader)?;

    info!("Loaded {} records", dataset.len());
    Ok(dataset)
}

/// Parse a dataset from any CSV source
pub fn read_dataset<R: Read>(source: R) -> Result<Dataset, AnalysisError> {
    parse(builder().from_reader(source))
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::All);
    builder
}

fn parse<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset, AnalysisError> {
    let headers = reader.headers().map_err(AnalysisError::Header)?.clone();
    validate_headers(&headers)?;

    let mut observations = Vec::new();
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(source) => {
                let line = source.position().map(|p| p.line()).unwrap_or_default();
                return Err(AnalysisError::InvalidRow { line, source });
            }
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: LatencyRow = record
            .deserialize(Some(&headers))
            .map_err(|source| AnalysisError::InvalidRow { line, source })?;

        observations.push(into_observation(row, line)?);
    }

    debug!("Parsed {} rows", observations.len());
    Ok(Dataset::new(observations))
}

fn validate_headers(headers: &StringRecord) -> Result<(), AnalysisError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AnalysisError::MissingColumn(column));
        }
    }
    Ok(())
}

fn into_observation(row: LatencyRow, line: u64) -> Result<Observation, AnalysisError> {
    if !row.latency.is_finite() {
        return Err(AnalysisError::NonFiniteLatency {
            line,
            value: row.latency,
        });
    }
    let message_type = row.message_type.trim();
    if message_type.is_empty() {
        return Err(AnalysisError::EmptyMessageType { line });
    }

    Ok(Observation::new(
        row.timestamp,
        row.room_id,
        message_type,
        row.latency,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_dataset_in_any_column_order() {
        let csv = "timestamp,messageType,latency,statusCode,roomId\n\
                   1700000000000,TEXT,12,OK,3\n\
                   1700000000500,JOIN,-1,FAIL,7\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.observations()[0],
            Observation::new(1_700_000_000_000, 3, "TEXT", 12.0)
        );
        assert_eq!(dataset.observations()[1].room_id, 7);
        assert!(!dataset.observations()[1].is_successful());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let csv = "timestamp, roomId, messageType, latency\n10, 1, TEXT , 4.5\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(dataset.observations()[0].message_type, "TEXT");
        assert_eq!(dataset.observations()[0].latency_ms, 4.5);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let csv = "timestamp,roomId,latency\n10,1,4.5\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn("messageType")));
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        let err = read_dataset("".as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn("timestamp")));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let dataset = read_dataset("timestamp,roomId,messageType,latency\n".as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_type_mismatch_reports_line() {
        let csv = "timestamp,roomId,messageType,latency\n10,1,TEXT,4\n20,one,TEXT,5\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        match err {
            AnalysisError::InvalidRow { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let csv = "timestamp,roomId,messageType,latency\n10,1,TEXT\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(AnalysisError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_nan_latency_is_rejected() {
        let csv = "timestamp,roomId,messageType,latency\n10,1,TEXT,NaN\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(AnalysisError::NonFiniteLatency { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_message_type_is_rejected() {
        let csv = "timestamp,roomId,messageType,latency\n10,1,,3\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(AnalysisError::EmptyMessageType { line: 2 })
        ));
    }

    #[test]
    fn test_load_dataset_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,roomId,messageType,latency").unwrap();
        writeln!(file, "0,1,TEXT,10").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let err = load_dataset("/nonexistent/latency.csv").unwrap_err();
        assert!(matches!(err, AnalysisError::Open { .. }));
    }
}
