use std::sync::Arc;

use serde_json::Value;

use crate::config::IngestConfig;
use crate::domain::{OhlcvFrame, RawCell, RawFrame};
use crate::http::{HttpClient, HttpRequest};
use crate::provider::ProviderId;
use crate::schema::enforce_schema;
use crate::source::{FetchRequest, OhlcvSource, ProviderError};

const QUERY_URL: &str = "https://www.alphavantage.co/query";
const TIME_SERIES_KEY: &str = "Time Series (Daily)";

/// Secondary provider: Alpha Vantage's keyed `TIME_SERIES_DAILY` endpoint.
///
/// Takes no date range: every call returns the provider's compact window of
/// roughly the 100 most recent daily bars. The API key is required at
/// construction; a missing credential never survives to fetch time.
pub struct AlphaVantageAdapter {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl AlphaVantageAdapter {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    /// Build from configuration, failing when no credential is present.
    pub fn from_config(
        http: Arc<dyn HttpClient>,
        config: &IngestConfig,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .alpha_vantage_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ProviderError::MissingCredential {
                provider: ProviderId::AlphaVantage,
            })?;
        Ok(Self::new(http, api_key))
    }
}

impl OhlcvSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::AlphaVantage
    }

    fn fetch_ohlcv(&self, req: &FetchRequest) -> Result<OhlcvFrame, ProviderError> {
        let request = HttpRequest::get(QUERY_URL)
            .with_query("function", "TIME_SERIES_DAILY")
            .with_query("symbol", req.symbol.as_str())
            .with_query("apikey", &self.api_key)
            .with_query("outputsize", "compact");

        let response = self.http.execute(request)?;
        if !response.is_success() {
            return Err(unexpected(format!("http status {}", response.status)));
        }

        let payload: Value = response
            .json()
            .map_err(|err| unexpected(err.to_string()))?;

        // Error and rate-limit payloads arrive as a differently-shaped
        // object with a notice field instead of the series key.
        let Some(series) = payload.get(TIME_SERIES_KEY).and_then(Value::as_object) else {
            return Err(unexpected(payload_notice(&payload)));
        };
        // A well-formed but empty series must not become an empty success,
        // or the orchestrator would stop falling back.
        if series.is_empty() {
            return Err(ProviderError::NoData {
                symbol: req.symbol.clone(),
            });
        }

        let mut timestamps = Vec::with_capacity(series.len());
        let mut opens = Vec::with_capacity(series.len());
        let mut highs = Vec::with_capacity(series.len());
        let mut lows = Vec::with_capacity(series.len());
        let mut closes = Vec::with_capacity(series.len());
        let mut volumes = Vec::with_capacity(series.len());

        for (date, bar) in series {
            timestamps.push(RawCell::Str(date.clone()));
            opens.push(RawCell::F64(price_field(bar, "1. open")?));
            highs.push(RawCell::F64(price_field(bar, "2. high")?));
            lows.push(RawCell::F64(price_field(bar, "3. low")?));
            closes.push(RawCell::F64(price_field(bar, "4. close")?));
            volumes.push(RawCell::I64(volume_field(bar)?));
        }

        let mut raw = RawFrame::new();
        raw.push_column("index", timestamps);
        raw.push_column("1. open", opens);
        raw.push_column("2. high", highs);
        raw.push_column("3. low", lows);
        raw.push_column("4. close", closes);
        raw.push_column("5. volume", volumes);

        let renamed = raw.rename(&[
            ("index", "timestamp"),
            ("1. open", "open"),
            ("2. high", "high"),
            ("3. low", "low"),
            ("4. close", "close"),
            ("5. volume", "volume"),
        ]);

        Ok(enforce_schema(renamed)?)
    }
}

fn unexpected(detail: impl Into<String>) -> ProviderError {
    ProviderError::UnexpectedPayload {
        provider: ProviderId::AlphaVantage,
        detail: detail.into(),
    }
}

/// Surface the provider's own explanation when the series key is absent.
fn payload_notice(payload: &Value) -> String {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(notice) = payload.get(key).and_then(Value::as_str) {
            return format!("{key}: {notice}");
        }
    }
    format!("missing '{TIME_SERIES_KEY}' key")
}

fn price_field(bar: &Value, key: &str) -> Result<f64, ProviderError> {
    let text = bar
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| unexpected(format!("missing field '{key}'")))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| unexpected(format!("non-numeric '{key}' value '{text}'")))
}

fn volume_field(bar: &Value) -> Result<i64, ProviderError> {
    let text = bar
        .get("5. volume")
        .and_then(Value::as_str)
        .ok_or_else(|| unexpected("missing field '5. volume'".to_owned()))?;
    text.trim()
        .parse::<i64>()
        .map_err(|_| unexpected(format!("non-integral '5. volume' value '{text}'")))
}
