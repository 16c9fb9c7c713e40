use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidProvider;

/// Closed set of upstream price-data providers.
///
/// Dispatch is by variant, never by string comparison; an identifier outside
/// this set is rejected when parsed, not discovered mid-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Yahoo,
    AlphaVantage,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Yahoo, Self::AlphaVantage];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::AlphaVantage => "alpha_vantage",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = InvalidProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "alpha_vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            other => Err(InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_identifiers() {
        for provider in ProviderId::ALL {
            assert_eq!(provider.as_str().parse::<ProviderId>(), Ok(provider));
        }
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = "bloomberg".parse::<ProviderId>().expect_err("must fail");
        assert_eq!(err.value, "bloomberg");
    }

    #[test]
    fn deserializes_snake_case() {
        let provider: ProviderId = serde_json::from_str("\"alpha_vantage\"").expect("valid json");
        assert_eq!(provider, ProviderId::AlphaVantage);
    }
}
