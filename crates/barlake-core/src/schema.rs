//! Canonical schema enforcement.
//!
//! `enforce_schema` is the single funnel between provider-shaped raw tables
//! and the canonical OHLCV frame. It reconciles shape only: column presence,
//! canonical order, timestamp typing, and row ordering. Duplicates, negative
//! values, and gaps are the validator's concern.

use std::cmp::Ordering;

use crate::domain::{OhlcvFrame, OhlcvRecord, RawCell, RawFrame, UtcDateTime};
use crate::error::SchemaError;

/// Canonical column order for the pipeline.
pub const EXPECTED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Normalize a raw table into the canonical OHLCV frame.
///
/// - Fails with [`SchemaError::MissingColumns`] when any canonical column is
///   absent (case-sensitive; adapters rename before calling).
/// - Extra columns are discarded.
/// - Timestamps become UTC instants: naive strings are read as UTC, zoned
///   strings are converted, integers are unix seconds, nulls pass through as
///   missing for the validator to reject.
/// - Rows are sorted ascending by timestamp (missing timestamps last) and
///   row positions reset to a contiguous sequence.
///
/// Pure and idempotent: normalizing an already-canonical frame changes
/// nothing.
pub fn enforce_schema(raw: RawFrame) -> Result<OhlcvFrame, SchemaError> {
    let missing: Vec<String> = EXPECTED_COLUMNS
        .iter()
        .filter(|name| raw.column(name).is_none())
        .map(|name| (*name).to_owned())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { columns: missing });
    }

    let timestamp = raw.column("timestamp").expect("presence checked above");
    let open = raw.column("open").expect("presence checked above");
    let high = raw.column("high").expect("presence checked above");
    let low = raw.column("low").expect("presence checked above");
    let close = raw.column("close").expect("presence checked above");
    let volume = raw.column("volume").expect("presence checked above");

    let row_count = timestamp.values.len();
    for (name, column) in [
        ("open", open),
        ("high", high),
        ("low", low),
        ("close", close),
        ("volume", volume),
    ] {
        if column.values.len() != row_count {
            return Err(SchemaError::RaggedColumn {
                column: name,
                expected: row_count,
                actual: column.values.len(),
            });
        }
    }

    let mut records = Vec::with_capacity(row_count);
    for row in 0..row_count {
        records.push(OhlcvRecord {
            timestamp: coerce_timestamp(&timestamp.values[row])?,
            open: coerce_price("open", &open.values[row])?,
            high: coerce_price("high", &high.values[row])?,
            low: coerce_price("low", &low.values[row])?,
            close: coerce_price("close", &close.values[row])?,
            volume: coerce_volume(&volume.values[row])?,
        });
    }

    records.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(OhlcvFrame { records })
}

fn coerce_timestamp(cell: &RawCell) -> Result<Option<UtcDateTime>, SchemaError> {
    match cell {
        RawCell::Null => Ok(None),
        RawCell::Str(value) => UtcDateTime::parse(value).map(Some),
        RawCell::I64(seconds) => UtcDateTime::from_unix_seconds(*seconds).map(Some),
        RawCell::F64(value) => Err(SchemaError::UnparsableTimestamp {
            value: value.to_string(),
        }),
    }
}

fn coerce_price(column: &'static str, cell: &RawCell) -> Result<f64, SchemaError> {
    match cell {
        RawCell::F64(value) => Ok(*value),
        RawCell::I64(value) => Ok(*value as f64),
        RawCell::Str(value) => value.trim().parse::<f64>().map_err(|_| {
            SchemaError::InvalidValue {
                column,
                value: value.clone(),
            }
        }),
        // A missing price is data quality, not a shape violation.
        RawCell::Null => Ok(f64::NAN),
    }
}

fn coerce_volume(cell: &RawCell) -> Result<i64, SchemaError> {
    match cell {
        RawCell::I64(value) => Ok(*value),
        RawCell::F64(value) if value.is_finite() && value.fract() == 0.0 => Ok(*value as i64),
        RawCell::Str(value) => value.trim().parse::<i64>().map_err(|_| {
            SchemaError::InvalidValue {
                column: "volume",
                value: value.clone(),
            }
        }),
        other => Err(SchemaError::InvalidValue {
            column: "volume",
            value: format!("{other:?}"),
        }),
    }
}
