//! Yahoo client against a local mock server

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::logging::{init_test_logging, log_test_step};
use rust_balance_sheets::{
    api::{StatementProvider, YahooClient},
    models::{Config, LineItem, RawValue},
    PipelineError,
};

fn client_for(server: &MockServer) -> YahooClient {
    let config = Config {
        provider_base_url: server.uri(),
        ..Config::default()
    };
    YahooClient::new(&config).expect("client")
}

fn timeseries_body() -> serde_json::Value {
    let results: Vec<serde_json::Value> = LineItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = format!("annual{}", item.timeseries_field());
            let mut entry = json!({
                "meta": {"symbol": ["AAPL"], "type": [field.as_str()]},
                "timestamp": [1664496000, 1696032000]
            });
            entry[field.as_str()] = json!([
                {"asOfDate": "2022-09-30", "reportedValue": {"raw": 1000.0 + i as f64}},
                {"asOfDate": "2023-09-30", "reportedValue": {"raw": 2000.0 + i as f64}}
            ]);
            entry
        })
        .collect();
    json!({"timeseries": {"result": results, "error": null}})
}

#[test_log::test(tokio::test)]
async fn test_fetch_balance_sheet() {
    init_test_logging();
    log_test_step("Balance sheet rows come back keyed by provider names");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/fundamentals-timeseries/v1/finance/timeseries/AAPL"))
        .and(query_param("symbol", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeseries_body()))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client_for(&server).fetch_balance_sheet("AAPL").await.unwrap();

    assert_eq!(raw.ticker, "AAPL");
    assert_eq!(raw.rows.len(), 9);
    assert_eq!(raw.period_labels(), vec!["2022-09-30", "2023-09-30"]);
    assert_eq!(
        raw.rows[LineItem::CurrentAssets.name()]["2023-09-30"],
        RawValue::Number(2001.0)
    );
}

#[test_log::test(tokio::test)]
async fn test_unknown_ticker_is_data_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/fundamentals-timeseries/v1/finance/timeseries/NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timeseries": {"result": [], "error": null}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws/fundamentals-timeseries/v1/finance/timeseries/GONE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_matches!(
        client.fetch_balance_sheet("NOPE").await,
        Err(PipelineError::DataUnavailable { ticker, .. }) if ticker == "NOPE"
    );
    assert_matches!(
        client.fetch_balance_sheet("GONE").await,
        Err(PipelineError::DataUnavailable { reason, .. }) if reason.contains("404")
    );
}

#[test_log::test(tokio::test)]
async fn test_fetch_exchange_rate_uses_last_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/USDEUR=X"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {"result": [{
                "meta": {"regularMarketPrice": 0.93},
                "indicators": {"quote": [{"close": [0.91, 0.92, null]}]}
            }], "error": null}
        })))
        .mount(&server)
        .await;

    let rate = client_for(&server).fetch_exchange_rate("USD", "EUR").await.unwrap();
    assert_eq!(rate, 0.92);
}

#[test_log::test(tokio::test)]
async fn test_missing_quote_is_rate_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/USDEUR=X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chart": {"result": []}})))
        .mount(&server)
        .await;

    assert_matches!(
        client_for(&server).fetch_exchange_rate("USD", "EUR").await,
        Err(PipelineError::RateUnavailable { pair, .. }) if pair == "USDEUR=X"
    );
}

#[test_log::test(tokio::test)]
async fn test_company_info_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/SAP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": {"result": [{
                "price": {"shortName": "SAP SE"},
                "assetProfile": {"sector": "Technology", "country": "Germany", "fullTimeEmployees": 107415}
            }]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/finance/search"))
        .and(query_param("q", "sap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quotes": [
                {"symbol": "SAP.DE", "shortname": "SAP SE"},
                {"symbol": "SAP", "shortname": "SAP SE"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let info = client.fetch_company_info("SAP").await.unwrap();
    assert_eq!(info.short_name.as_deref(), Some("SAP SE"));
    assert_eq!(info.country.as_deref(), Some("Germany"));
    assert_eq!(info.full_time_employees, Some(107415));

    let suggestions = client.search_tickers("sap").await.unwrap();
    assert_eq!(suggestions.len(), 2);
    assert!(suggestions.iter().any(|s| s.symbol == "SAP.DE"));
}
