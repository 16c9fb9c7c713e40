//! Provider-fallback ingestion.
//!
//! The orchestrator walks an ordered provider priority, hands the request to
//! each registered adapter in turn, and returns the first canonical frame it
//! gets back. Adapter failures of any kind are downgraded to recorded
//! warnings; only exhaustion of the whole list surfaces as an error.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::config::IngestConfig;
use crate::domain::{OhlcvFrame, Symbol};
use crate::http::HttpClient;
use crate::provider::ProviderId;
use crate::source::{FetchRequest, OhlcvSource, ProviderError};

/// One recorded per-provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub provider: ProviderId,
    pub error: String,
}

/// Successful fetch: exactly one provider's data, plus the failures that
/// preceded it in the priority list.
#[derive(Debug)]
pub struct FetchOutcome {
    pub frame: OhlcvFrame,
    pub selected: ProviderId,
    pub attempts: Vec<FetchAttempt>,
}

/// Raised only when every configured provider has failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all providers failed for symbol {symbol}")]
    AllProvidersFailed {
        symbol: Symbol,
        attempts: Vec<FetchAttempt>,
    },
}

/// Adapter registry plus the configured priority order.
pub struct Ingestor {
    sources: HashMap<ProviderId, Arc<dyn OhlcvSource>>,
    priority: Vec<ProviderId>,
}

impl Ingestor {
    /// Register adapters; the default priority is the order given here.
    pub fn new(sources: Vec<Arc<dyn OhlcvSource>>) -> Self {
        let priority = sources.iter().map(|source| source.id()).collect();
        let sources = sources
            .into_iter()
            .map(|source| (source.id(), source))
            .collect();
        Self { sources, priority }
    }

    /// Build adapters for every provider in the configured priority.
    ///
    /// Credential problems surface here, at construction, not at fetch time:
    /// Alpha Vantage in the priority without an API key is an immediate
    /// [`ProviderError::MissingCredential`].
    pub fn from_config(
        config: &IngestConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ProviderError> {
        let mut sources: Vec<Arc<dyn OhlcvSource>> = Vec::new();
        for provider in &config.providers.priority {
            match provider {
                ProviderId::Yahoo => {
                    sources.push(Arc::new(YahooAdapter::new(Arc::clone(&http))));
                }
                ProviderId::AlphaVantage => {
                    sources.push(Arc::new(AlphaVantageAdapter::from_config(
                        Arc::clone(&http),
                        config,
                    )?));
                }
            }
        }
        Ok(Self::new(sources))
    }

    /// Fetch with the configured priority order.
    pub fn fetch(&self, req: &FetchRequest) -> Result<FetchOutcome, FetchError> {
        self.fetch_with_priority(req, &self.priority)
    }

    /// Try providers in the given order; first success wins.
    ///
    /// A provider in the list with no registered adapter is a recorded
    /// per-provider failure, not an abort. Data from different providers is
    /// never merged: the outcome carries at most one provider's frame.
    pub fn fetch_with_priority(
        &self,
        req: &FetchRequest,
        priority: &[ProviderId],
    ) -> Result<FetchOutcome, FetchError> {
        let mut attempts = Vec::new();

        for provider in priority {
            tracing::info!(provider = %provider, symbol = %req.symbol, "fetch attempt");

            let result = match self.sources.get(provider) {
                Some(source) => source.fetch_ohlcv(req),
                None => Err(ProviderError::NotRegistered {
                    provider: *provider,
                }),
            };

            match result {
                Ok(frame) => {
                    return Ok(FetchOutcome {
                        frame,
                        selected: *provider,
                        attempts,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %provider,
                        symbol = %req.symbol,
                        error = %error,
                        "fetch failed"
                    );
                    attempts.push(FetchAttempt {
                        provider: *provider,
                        error: error.to_string(),
                    });
                }
            }
        }

        Err(FetchError::AllProvidersFailed {
            symbol: req.symbol.clone(),
            attempts,
        })
    }
}
