//! Structural sanity checks over a normalized frame.
//!
//! Each check is independent and side-effect free; `validate` runs all four
//! in a fixed order and stops at the first failure. Failures here mean the
//! shape contract was violated upstream, so nothing in this crate catches
//! them.

use std::collections::HashSet;

use crate::domain::OhlcvFrame;
use crate::error::ValidationError;

/// Fail if any record has no timestamp.
pub fn check_missing_timestamps(frame: &OhlcvFrame) -> Result<(), ValidationError> {
    if frame.iter().any(|record| record.timestamp.is_none()) {
        return Err(ValidationError::MissingTimestamps);
    }
    Ok(())
}

/// Fail if any timestamp value repeats.
pub fn check_duplicates(frame: &OhlcvFrame) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for record in frame.iter() {
        if let Some(ts) = record.timestamp {
            if !seen.insert(ts) {
                return Err(ValidationError::DuplicateTimestamps);
            }
        }
    }
    Ok(())
}

/// Fail if timestamps are not in non-decreasing order.
pub fn check_sorted(frame: &OhlcvFrame) -> Result<(), ValidationError> {
    let ascending = frame
        .records
        .windows(2)
        .all(|pair| match (pair[0].timestamp, pair[1].timestamp) {
            (Some(left), Some(right)) => left <= right,
            _ => true,
        });
    if !ascending {
        return Err(ValidationError::NotSorted);
    }
    Ok(())
}

/// Fail on the first column, in canonical order, containing any negative
/// value. The scan is column-major: all rows of `open` are inspected before
/// any row of `high`, and so on. `NaN` prices are missing data, not
/// negatives.
pub fn check_negative_values(frame: &OhlcvFrame) -> Result<(), ValidationError> {
    for index in 0..4 {
        for record in frame.iter() {
            let (column, value) = record.prices()[index];
            if value < 0.0 {
                return Err(ValidationError::NegativeValue { column });
            }
        }
    }
    if frame.iter().any(|record| record.volume < 0) {
        return Err(ValidationError::NegativeValue { column: "volume" });
    }
    Ok(())
}

/// Run all checks in order: missing timestamps, duplicates, sort order,
/// negative values. Never mutates its input.
pub fn validate(frame: &OhlcvFrame) -> Result<(), ValidationError> {
    check_missing_timestamps(frame)?;
    check_duplicates(frame)?;
    check_sorted(frame)?;
    check_negative_values(frame)?;
    Ok(())
}
