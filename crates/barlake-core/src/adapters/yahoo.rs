use std::sync::Arc;

use serde::Deserialize;
use time::macros::date;
use time::{Date, OffsetDateTime};

use crate::domain::{OhlcvFrame, RawCell, RawFrame, UtcDateTime};
use crate::http::{HttpClient, HttpRequest};
use crate::provider::ProviderId;
use crate::schema::enforce_schema;
use crate::source::{FetchRequest, OhlcvSource, ProviderError};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// History begins here when the caller gives no start date.
const DEFAULT_START: Date = date!(2015 - 01 - 01);

/// Primary provider: Yahoo's delayed daily-bar chart endpoint.
///
/// Accepts an optional `[start, end]` date range; `end` defaults to the
/// current UTC date. Yahoo treats the upper bound exclusively at the wire,
/// so the adapter passes the midnight after `end` and the caller-facing
/// range is inclusive on both sides.
pub struct YahooAdapter {
    http: Arc<dyn HttpClient>,
}

impl YahooAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl OhlcvSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch_ohlcv(&self, req: &FetchRequest) -> Result<OhlcvFrame, ProviderError> {
        let start = req.start.unwrap_or(DEFAULT_START);
        let end = req.end.unwrap_or_else(|| OffsetDateTime::now_utc().date());
        let period1 = UtcDateTime::from_utc_date(start).unix_seconds();
        let period2 = UtcDateTime::from_utc_date(end.next_day().unwrap_or(end)).unix_seconds();

        let request = HttpRequest::get(format!("{CHART_URL}/{}", req.symbol))
            .with_query("period1", period1.to_string())
            .with_query("period2", period2.to_string())
            .with_query("interval", "1d")
            .with_query("events", "div,splits");

        let response = self.http.execute(request)?;
        if !response.is_success() {
            return Err(ProviderError::UnexpectedPayload {
                provider: ProviderId::Yahoo,
                detail: format!("http status {}", response.status),
            });
        }

        let envelope: ChartEnvelope = response
            .json()
            .map_err(|err| ProviderError::UnexpectedPayload {
                provider: ProviderId::Yahoo,
                detail: err.to_string(),
            })?;

        if let Some(error) = envelope.chart.error {
            return Err(ProviderError::UnexpectedPayload {
                provider: ProviderId::Yahoo,
                detail: error.to_string(),
            });
        }

        let result = envelope
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoData {
                symbol: req.symbol.clone(),
            })?;
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let raw = chart_to_raw(&result.timestamp, &quote);
        if raw.column("Date").map_or(true, |col| col.values.is_empty()) {
            return Err(ProviderError::NoData {
                symbol: req.symbol.clone(),
            });
        }

        let renamed = raw.rename(&[
            ("Date", "timestamp"),
            ("Open", "open"),
            ("High", "high"),
            ("Low", "low"),
            ("Close", "close"),
            ("Volume", "volume"),
        ]);

        Ok(enforce_schema(renamed)?)
    }
}

/// Build the provider-shaped raw table from the chart arrays.
///
/// Yahoo emits placeholder bars with null quote fields for sessions without
/// trades; those rows are dropped here rather than forwarded as gaps.
fn chart_to_raw(timestamps: &[i64], quote: &ChartQuote) -> RawFrame {
    let mut dates = Vec::with_capacity(timestamps.len());
    let mut opens = Vec::with_capacity(timestamps.len());
    let mut highs = Vec::with_capacity(timestamps.len());
    let mut lows = Vec::with_capacity(timestamps.len());
    let mut closes = Vec::with_capacity(timestamps.len());
    let mut volumes = Vec::with_capacity(timestamps.len());

    for (index, ts) in timestamps.iter().enumerate() {
        let bar = (
            quote.open.get(index).copied().flatten(),
            quote.high.get(index).copied().flatten(),
            quote.low.get(index).copied().flatten(),
            quote.close.get(index).copied().flatten(),
            quote.volume.get(index).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = bar else {
            continue;
        };

        dates.push(RawCell::I64(*ts));
        opens.push(RawCell::F64(open));
        highs.push(RawCell::F64(high));
        lows.push(RawCell::F64(low));
        closes.push(RawCell::F64(close));
        volumes.push(RawCell::I64(volume));
    }

    let mut raw = RawFrame::new();
    raw.push_column("Date", dates);
    raw.push_column("Open", opens);
    raw.push_column("High", highs);
    raw.push_column("Low", lows);
    raw.push_column("Close", closes);
    raw.push_column("Volume", volumes);
    raw
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Symbol;
    use crate::http::{HttpError, HttpResponse};

    struct StaticClient {
        response: HttpResponse,
    }

    impl HttpClient for StaticClient {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HttpError> {
            Ok(self.response.clone())
        }
    }

    fn adapter_with_body(body: &str) -> YahooAdapter {
        YahooAdapter::new(Arc::new(StaticClient {
            response: HttpResponse::new(200, body),
        }))
    }

    fn request() -> FetchRequest {
        FetchRequest::new(Symbol::parse("AAPL").expect("valid symbol"))
    }

    #[test]
    fn parses_chart_payload_into_canonical_frame() {
        // 2024-01-03 precedes 2024-01-02 in the payload; normalization sorts.
        let body = r#"{"chart":{"result":[{"timestamp":[1704240000,1704153600],
            "indicators":{"quote":[{"open":[11.0,10.0],"high":[12.0,11.0],
            "low":[10.5,9.0],"close":[11.5,10.5],"volume":[1100,1000]}]}}],"error":null}}"#;

        let frame = adapter_with_body(body)
            .fetch_ohlcv(&request())
            .expect("valid payload");

        assert_eq!(frame.len(), 2);
        assert_eq!(
            frame.records[0].timestamp.expect("present").format_rfc3339(),
            "2024-01-02T00:00:00Z"
        );
        assert_eq!(frame.records[0].volume, 1000);
        assert_eq!(frame.records[1].open, 11.0);
    }

    #[test]
    fn drops_null_placeholder_bars() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704153600,1704240000],
            "indicators":{"quote":[{"open":[10.0,null],"high":[11.0,null],
            "low":[9.0,null],"close":[10.5,null],"volume":[1000,null]}]}}],"error":null}}"#;

        let frame = adapter_with_body(body)
            .fetch_ohlcv(&request())
            .expect("valid payload");
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn empty_result_is_no_data() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        let err = adapter_with_body(body)
            .fetch_ohlcv(&request())
            .expect_err("no data");
        assert!(matches!(err, ProviderError::NoData { .. }));
    }

    #[test]
    fn chart_error_field_is_unexpected_payload() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found"}}}"#;
        let err = adapter_with_body(body)
            .fetch_ohlcv(&request())
            .expect_err("error payload");
        assert!(matches!(err, ProviderError::UnexpectedPayload { .. }));
    }
}
