use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::SchemaError;

const NAIVE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const NAIVE_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const NAIVE_DATETIME_T: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Instant guaranteed to carry the UTC offset.
///
/// Provider feeds hand back timestamps in three shapes: RFC3339 strings with
/// an arbitrary offset, naive calendar dates/datetimes, and unix seconds.
/// All three converge here: zoned values are converted to UTC, naive values
/// are read as already being UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parse a provider timestamp string.
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        let trimmed = input.trim();

        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self::from_offset_datetime(parsed));
        }
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, NAIVE_DATETIME) {
            return Ok(Self(parsed.assume_utc()));
        }
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, NAIVE_DATETIME_T) {
            return Ok(Self(parsed.assume_utc()));
        }
        if let Ok(parsed) = Date::parse(trimmed, NAIVE_DATE) {
            return Ok(Self::from_utc_date(parsed));
        }

        Err(SchemaError::UnparsableTimestamp {
            value: trimmed.to_owned(),
        })
    }

    /// Convert any zoned instant to its UTC representation.
    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }

    /// Midnight UTC of the given calendar date.
    pub fn from_utc_date(date: Date) -> Self {
        Self(date.midnight().assume_utc())
    }

    pub fn from_unix_seconds(seconds: i64) -> Result<Self, SchemaError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|_| SchemaError::UnparsableTimestamp {
                value: seconds.to_string(),
            })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }

    pub fn unix_seconds(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .expect("UtcDateTime must be RFC3339 formattable")
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
