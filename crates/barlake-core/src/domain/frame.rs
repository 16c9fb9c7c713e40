use serde::Serialize;

use crate::domain::UtcDateTime;

/// One loosely typed cell of a raw provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Null,
    Str(String),
    F64(f64),
    I64(i64),
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

/// Named column of raw cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<RawCell>,
}

/// Column-major, provider-shaped table.
///
/// This is the transient hand-off between an adapter's payload decoding and
/// the schema normalizer. Column names are whatever the provider used until
/// the adapter renames them; cell types are whatever the wire carried.
/// A `RawFrame` is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    columns: Vec<RawColumn>,
}

impl RawFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. A repeated name replaces the earlier column, which
    /// keeps adapter rename-then-push sequences deterministic.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<RawCell>) {
        let name = name.into();
        self.columns.retain(|column| column.name != name);
        self.columns.push(RawColumn { name, values });
    }

    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Rename columns from provider-native labels to canonical ones.
    /// Names absent from the frame are ignored.
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Self {
        for column in &mut self.columns {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.name) {
                column.name = (*to).to_owned();
            }
        }
        self
    }
}

/// One canonical daily bar.
///
/// `timestamp` stays optional in memory: the normalizer carries missing
/// values through and the validator owns the missing-timestamp check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvRecord {
    pub timestamp: Option<UtcDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvRecord {
    /// Price fields paired with their canonical column names, in canonical
    /// column order.
    pub fn prices(&self) -> [(&'static str, f64); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }
}

/// Canonical OHLCV table for one symbol: the only shape the validator and
/// the warehouse accept. Produced exclusively by `enforce_schema`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OhlcvFrame {
    pub records: Vec<OhlcvRecord>,
}

impl OhlcvFrame {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OhlcvRecord> {
        self.records.iter()
    }
}

impl From<OhlcvFrame> for RawFrame {
    /// Lower a canonical frame back to raw cells so normalization can be
    /// re-applied. `enforce_schema` is idempotent over this round trip.
    fn from(frame: OhlcvFrame) -> Self {
        let mut timestamps = Vec::with_capacity(frame.len());
        let mut opens = Vec::with_capacity(frame.len());
        let mut highs = Vec::with_capacity(frame.len());
        let mut lows = Vec::with_capacity(frame.len());
        let mut closes = Vec::with_capacity(frame.len());
        let mut volumes = Vec::with_capacity(frame.len());

        for record in frame.records {
            timestamps.push(match record.timestamp {
                Some(ts) => RawCell::Str(ts.format_rfc3339()),
                None => RawCell::Null,
            });
            opens.push(RawCell::F64(record.open));
            highs.push(RawCell::F64(record.high));
            lows.push(RawCell::F64(record.low));
            closes.push(RawCell::F64(record.close));
            volumes.push(RawCell::I64(record.volume));
        }

        let mut raw = RawFrame::new();
        raw.push_column("timestamp", timestamps);
        raw.push_column("open", opens);
        raw.push_column("high", highs);
        raw.push_column("low", lows);
        raw.push_column("close", closes);
        raw.push_column("volume", volumes);
        raw
    }
}
