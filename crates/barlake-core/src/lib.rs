//! Core contracts for barlake.
//!
//! This crate contains:
//! - Canonical OHLCV domain model and validation
//! - Schema normalization from raw provider tables
//! - Provider identifiers, adapters, and the fallback ingestion orchestrator
//! - The blocking HTTP seam and explicit pipeline configuration

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod ingest;
pub mod provider;
pub mod schema;
pub mod source;
pub mod validate;

pub use adapters::{AlphaVantageAdapter, YahooAdapter};
pub use config::{IngestConfig, ProvidersConfig};
pub use domain::{OhlcvFrame, OhlcvRecord, RawCell, RawColumn, RawFrame, Symbol, UtcDateTime};
pub use error::{InvalidProvider, SchemaError, SymbolError, ValidationError};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestClient};
pub use ingest::{FetchAttempt, FetchError, FetchOutcome, Ingestor};
pub use provider::ProviderId;
pub use schema::{enforce_schema, EXPECTED_COLUMNS};
pub use source::{FetchRequest, OhlcvSource, ProviderError};
pub use validate::{
    check_duplicates, check_missing_timestamps, check_negative_values, check_sorted, validate,
};
