//! Behavior of the provider-fallback ingestion pipeline end to end:
//! real adapters over a scripted transport, through the orchestrator,
//! down to the validator.

use std::sync::Arc;

use barlake_core::http::HttpResponse;
use barlake_core::{
    validate, FetchError, FetchRequest, IngestConfig, Ingestor, ProviderError, ProviderId, Symbol,
};
use barlake_tests::{
    alpha_vantage_body, yahoo_chart_body, ScriptedHttpClient, ALPHA_VANTAGE_RATE_LIMIT_BODY,
};

const JAN_02: i64 = 1_704_153_600; // 2024-01-02T00:00:00Z
const FEB_01: i64 = 1_706_745_600; // 2024-02-01T00:00:00Z

fn config_with_key() -> IngestConfig {
    IngestConfig {
        alpha_vantage_api_key: Some(String::from("test-key")),
        ..IngestConfig::default()
    }
}

fn request() -> FetchRequest {
    FetchRequest::new(Symbol::parse("AAPL").expect("valid symbol"))
}

#[test]
fn when_primary_succeeds_secondary_is_never_called() {
    let http = Arc::new(ScriptedHttpClient::new().respond(
        "query1.finance.yahoo.com",
        HttpResponse::new(200, yahoo_chart_body(&[(JAN_02, 10.0, 1000)])),
    ));
    let ingestor =
        Ingestor::from_config(&config_with_key(), http.clone()).expect("config is valid");

    let outcome = ingestor.fetch(&request()).expect("primary succeeds");

    assert_eq!(outcome.selected, ProviderId::Yahoo);
    assert!(outcome.attempts.is_empty());
    assert_eq!(http.request_count_for("alphavantage.co"), 0);
}

#[test]
fn when_primary_fails_fetch_falls_back_to_secondary() {
    // Yahoo is unscripted, so its request fails at the transport; the
    // orchestrator records the failure and moves on.
    let http = Arc::new(ScriptedHttpClient::new().respond(
        "alphavantage.co",
        HttpResponse::new(200, alpha_vantage_body(&[("2024-01-02", 10.0, 1000)])),
    ));
    let ingestor =
        Ingestor::from_config(&config_with_key(), http.clone()).expect("config is valid");

    let outcome = ingestor.fetch(&request()).expect("secondary succeeds");

    assert_eq!(outcome.selected, ProviderId::AlphaVantage);
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].provider, ProviderId::Yahoo);
    assert_eq!(outcome.frame.len(), 1);
    assert_eq!(outcome.frame.records[0].volume, 1000);
}

#[test]
fn when_every_provider_fails_the_error_names_the_symbol() {
    let http = Arc::new(
        ScriptedHttpClient::new().respond("alphavantage.co", HttpResponse::new(200, ALPHA_VANTAGE_RATE_LIMIT_BODY)),
    );
    let ingestor =
        Ingestor::from_config(&config_with_key(), http).expect("config is valid");

    let err = ingestor.fetch(&request()).expect_err("both providers fail");

    let FetchError::AllProvidersFailed { symbol, attempts } = err;
    assert_eq!(symbol.as_str(), "AAPL");
    assert_eq!(attempts.len(), 2);
    assert!(attempts[1].error.contains("Note:"), "rate-limit notice should be recorded");
}

#[test]
fn empty_yahoo_result_falls_through_as_no_data() {
    let http = Arc::new(
        ScriptedHttpClient::new()
            .respond(
                "query1.finance.yahoo.com",
                HttpResponse::new(200, r#"{"chart":{"result":[],"error":null}}"#),
            )
            .respond(
                "alphavantage.co",
                HttpResponse::new(200, alpha_vantage_body(&[("2024-01-02", 10.0, 1000)])),
            ),
    );
    let ingestor =
        Ingestor::from_config(&config_with_key(), http).expect("config is valid");

    let outcome = ingestor.fetch(&request()).expect("secondary succeeds");

    assert_eq!(outcome.selected, ProviderId::AlphaVantage);
    assert!(outcome.attempts[0].error.contains("no data"));
}

#[test]
fn fetched_frame_passes_validation() {
    let http = Arc::new(ScriptedHttpClient::new().respond(
        "query1.finance.yahoo.com",
        HttpResponse::new(
            200,
            // Delivered newest-first; normalization must restore ascending order.
            yahoo_chart_body(&[(FEB_01, 20.0, 2000), (JAN_02, 10.0, 1000)]),
        ),
    ));
    let ingestor =
        Ingestor::from_config(&config_with_key(), http).expect("config is valid");

    let outcome = ingestor.fetch(&request()).expect("primary succeeds");

    assert_eq!(outcome.frame.len(), 2);
    validate(&outcome.frame).expect("normalized frame satisfies all invariants");
}

#[test]
fn secondary_in_priority_without_credential_fails_at_construction() {
    let config = IngestConfig::default();
    let err = Ingestor::from_config(&config, Arc::new(ScriptedHttpClient::new()))
        .err()
        .expect("credential missing");

    assert!(matches!(
        err,
        ProviderError::MissingCredential {
            provider: ProviderId::AlphaVantage,
        }
    ));
}

#[test]
fn yahoo_only_priority_needs_no_credential() {
    let mut config = IngestConfig::default();
    config.providers.priority = vec![ProviderId::Yahoo];
    let http = Arc::new(ScriptedHttpClient::new().respond(
        "query1.finance.yahoo.com",
        HttpResponse::new(200, yahoo_chart_body(&[(JAN_02, 10.0, 1000)])),
    ));

    let ingestor = Ingestor::from_config(&config, http).expect("no key required");
    let outcome = ingestor.fetch(&request()).expect("primary succeeds");
    assert_eq!(outcome.selected, ProviderId::Yahoo);
}
