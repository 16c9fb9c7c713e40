//! Blocking HTTP seam for provider adapters.
//!
//! Adapters depend on the [`HttpClient`] trait rather than a concrete
//! client, so tests can script responses without touching the network.
//! [`ReqwestClient`] is the production implementation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build http client: {message}")]
    Build { message: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    #[error("no live transport configured")]
    NoTransport,
}

/// Outgoing GET request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Response envelope: status plus the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|err| HttpError::Decode {
            message: err.to_string(),
        })
    }
}

/// Blocking transport used by provider adapters.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Production client backed by `reqwest::blocking`.
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, HttpError> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(concat!("barlake/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| HttpError::Build {
                message: err.to_string(),
            })?;
        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self
            .inner
            .get(&request.url)
            .query(&request.query)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .map_err(|err| HttpError::Transport {
                url: request.url.clone(),
                message: err.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|err| HttpError::Transport {
            url: request.url,
            message: err.to_string(),
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Client that refuses every request. Keeps adapter construction possible in
/// contexts where no network call is expected to happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
        Err(HttpError::NoTransport)
    }
}
