use thiserror::Error;
use time::Date;

use crate::domain::{OhlcvFrame, Symbol};
use crate::error::SchemaError;
use crate::http::HttpError;
use crate::provider::ProviderId;

/// Failure modes an individual provider adapter can report.
///
/// All of these are treated as transient by the orchestrator: it records the
/// failure and moves on to the next provider in the priority list.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned no data for symbol {symbol}")]
    NoData { symbol: Symbol },

    #[error("missing API credential for provider {provider}")]
    MissingCredential { provider: ProviderId },

    #[error("unexpected payload from provider {provider}: {detail}")]
    UnexpectedPayload { provider: ProviderId, detail: String },

    #[error("no adapter registered for provider {provider}")]
    NotRegistered { provider: ProviderId },

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// One fetch call's parameters.
///
/// `start`/`end` are calendar dates; adapters that take no date range (Alpha
/// Vantage) ignore them by contract. End-date inclusivity is documented per
/// adapter, since the upstream semantics differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: Symbol,
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl FetchRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            start: None,
            end: None,
        }
    }

    pub fn with_range(mut self, start: Date, end: Date) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Capability shared by every provider adapter: fetch daily OHLCV history
/// and return it already normalized to the canonical frame.
pub trait OhlcvSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn fetch_ohlcv(&self, req: &FetchRequest) -> Result<OhlcvFrame, ProviderError>;
}
