//! Partitioned Parquet archive.
//!
//! A validated canonical frame is split by `(symbol, year, month)` and each
//! group lands as one columnar file in a hive-style layout:
//!
//! ```text
//! data/
//!   symbol=AAPL/
//!     year=2024/
//!       month=01/
//!         data.parquet
//! ```
//!
//! Each `store` call fully replaces the partitions it touches; there is no
//! append or merge with prior contents, and concurrent writers targeting the
//! same partition must be serialized by the caller (last writer wins).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use thiserror::Error;

use barlake_core::config::IngestConfig;
use barlake_core::domain::{OhlcvRecord, RawFrame, Symbol};
use barlake_core::error::SchemaError;
use barlake_core::schema::enforce_schema;

pub const PARTITION_FILE: &str = "data.parquet";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("cannot partition a record with no timestamp")]
    MissingTimestamp,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// One partition written by a `store` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// What a `store` call wrote, in partition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub partitions: Vec<PartitionSummary>,
}

impl StoreReport {
    pub fn rows_written(&self) -> usize {
        self.partitions.iter().map(|partition| partition.rows).sum()
    }
}

/// Persist a table under `data_dir` in the partitioned layout.
///
/// Accepts either a raw or an already-canonical table; normalization is
/// re-applied defensively and is idempotent, so both arrive at the same
/// result. Partition columns are derived from the timestamp and never
/// persisted — each file carries exactly the five canonical columns.
pub fn store(
    symbol: &Symbol,
    table: impl Into<RawFrame>,
    data_dir: &Path,
) -> Result<StoreReport, StoreError> {
    let frame = enforce_schema(table.into())?;

    let mut partitions: BTreeMap<(i32, u8), Vec<OhlcvRecord>> = BTreeMap::new();
    for record in frame.records {
        let ts = record.timestamp.ok_or(StoreError::MissingTimestamp)?;
        partitions
            .entry((ts.year(), ts.month()))
            .or_default()
            .push(record);
    }

    let base = data_dir.join(format!("symbol={symbol}"));
    let mut report = StoreReport::default();

    for ((year, month), records) in partitions {
        let dir = base
            .join(format!("year={year}"))
            .join(format!("month={month:02}"));
        fs::create_dir_all(&dir)?;

        let path = dir.join(PARTITION_FILE);
        write_partition(&path, &records)?;

        report.partitions.push(PartitionSummary {
            path,
            rows: records.len(),
        });
    }

    Ok(report)
}

/// `store` with the output root taken from configuration.
pub fn store_with_config(
    symbol: &Symbol,
    table: impl Into<RawFrame>,
    config: &IngestConfig,
) -> Result<StoreReport, StoreError> {
    store(symbol, table, &config.data_dir)
}

fn write_partition(path: &Path, records: &[OhlcvRecord]) -> Result<(), StoreError> {
    let batch = to_record_batch(records)?;

    // File::create truncates: a prior partition file is fully replaced.
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Arrow schema of one partition file: the five canonical columns, UTC
/// millisecond timestamps, float prices, integer volume.
pub fn partition_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
            false,
        ),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("volume", DataType::Int64, false),
    ])
}

fn to_record_batch(records: &[OhlcvRecord]) -> Result<RecordBatch, StoreError> {
    let mut timestamps = Vec::with_capacity(records.len());
    for record in records {
        let ts = record.timestamp.ok_or(StoreError::MissingTimestamp)?;
        timestamps.push(ts.unix_millis());
    }

    let timestamp_array = TimestampMillisecondArray::from(timestamps).with_timezone("UTC");
    let columns: Vec<ArrayRef> = vec![
        Arc::new(timestamp_array),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|record| record.open),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|record| record.high),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|record| record.low),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|record| record.close),
        )),
        Arc::new(Int64Array::from_iter_values(
            records.iter().map(|record| record.volume),
        )),
    ];

    Ok(RecordBatch::try_new(Arc::new(partition_schema()), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barlake_core::domain::{OhlcvFrame, RawCell, UtcDateTime};

    fn symbol() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    fn record(ts: &str, open: f64, volume: i64) -> OhlcvRecord {
        OhlcvRecord {
            timestamp: Some(UtcDateTime::parse(ts).expect("valid timestamp")),
            open,
            high: open + 1.0,
            low: open - 1.0,
            close: open + 0.5,
            volume,
        }
    }

    #[test]
    fn writes_one_file_per_month() {
        let dir = tempfile::tempdir().expect("tempdir");
        let frame = OhlcvFrame {
            records: vec![
                record("2024-01-02", 10.0, 1000),
                record("2024-01-03", 10.5, 1100),
                record("2024-02-01", 20.0, 2000),
            ],
        };

        let report = store(&symbol(), frame, dir.path()).expect("store succeeds");

        assert_eq!(report.partitions.len(), 2);
        assert_eq!(report.rows_written(), 3);
        assert!(dir
            .path()
            .join("symbol=AAPL/year=2024/month=01/data.parquet")
            .is_file());
        assert!(dir
            .path()
            .join("symbol=AAPL/year=2024/month=02/data.parquet")
            .is_file());
    }

    #[test]
    fn month_directories_are_zero_padded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let frame = OhlcvFrame {
            records: vec![record("2024-09-02", 10.0, 1000)],
        };

        let report = store(&symbol(), frame, dir.path()).expect("store succeeds");
        assert!(report.partitions[0]
            .path
            .ends_with("symbol=AAPL/year=2024/month=09/data.parquet"));
    }

    #[test]
    fn renormalizes_unsorted_raw_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut raw = RawFrame::new();
        raw.push_column(
            "timestamp",
            vec![RawCell::from("2024-01-03"), RawCell::from("2024-01-02")],
        );
        raw.push_column("open", vec![RawCell::from(11.0), RawCell::from(10.0)]);
        raw.push_column("high", vec![RawCell::from(12.0), RawCell::from(11.0)]);
        raw.push_column("low", vec![RawCell::from(10.0), RawCell::from(9.0)]);
        raw.push_column("close", vec![RawCell::from(11.5), RawCell::from(10.5)]);
        raw.push_column(
            "volume",
            vec![RawCell::from(1100_i64), RawCell::from(1000_i64)],
        );

        let report = store(&symbol(), raw, dir.path()).expect("raw input is normalized");
        assert_eq!(report.partitions.len(), 1);
        assert_eq!(report.rows_written(), 2);
    }

    #[test]
    fn record_without_timestamp_fails_closed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut frame = OhlcvFrame {
            records: vec![record("2024-01-02", 10.0, 1000)],
        };
        frame.records[0].timestamp = None;

        let err = store(&symbol(), frame, dir.path()).expect_err("unpartitionable");
        assert!(matches!(err, StoreError::MissingTimestamp));
    }

    #[test]
    fn store_with_config_uses_configured_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = IngestConfig {
            data_dir: dir.path().to_path_buf(),
            ..IngestConfig::default()
        };
        let frame = OhlcvFrame {
            records: vec![record("2024-01-02", 10.0, 1000)],
        };

        store_with_config(&symbol(), frame, &config).expect("store succeeds");
        assert!(dir
            .path()
            .join("symbol=AAPL/year=2024/month=01/data.parquet")
            .is_file());
    }

    #[test]
    fn missing_column_in_raw_input_propagates_schema_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut raw = RawFrame::new();
        raw.push_column("timestamp", vec![RawCell::from("2024-01-02")]);

        let err = store(&symbol(), raw, dir.path()).expect_err("shape violation");
        assert!(matches!(err, StoreError::Schema(_)));
    }
}
