use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SymbolError;

const MAX_SYMBOL_LEN: usize = 12;

/// Validated uppercase ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol(String);

impl Symbol {
    /// Validate and normalize a ticker. Input is trimmed and uppercased;
    /// the result must start with an ASCII letter and contain only
    /// `A-Z`, `0-9`, `.` or `-`.
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let normalized = input.trim().to_ascii_uppercase();

        let Some(first) = normalized.chars().next() else {
            return Err(SymbolError::Empty);
        };
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong {
                len: normalized.len(),
                max: MAX_SYMBOL_LEN,
            });
        }
        if !first.is_ascii_alphabetic() {
            return Err(SymbolError::InvalidStart { ch: first });
        }
        for (index, ch) in normalized.chars().enumerate() {
            if !(ch.is_ascii_alphanumeric() || ch == '.' || ch == '-') {
                return Err(SymbolError::InvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
