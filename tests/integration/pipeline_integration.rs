//! Integration tests for the memoized per-ticker pipeline

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use crate::common::logging::{init_test_logging, log_test_data, log_test_step};
use crate::common::test_data::create_raw_statement_without;
use crate::common::FakeProvider;
use rust_balance_sheets::{
    concurrent_fetcher::{fetch_statements_concurrently, ConcurrentFetchConfig},
    models::{Config, LineItem},
    pipeline::StatementPipeline,
    PipelineError,
};

fn pipeline_over(provider: Arc<FakeProvider>) -> StatementPipeline {
    StatementPipeline::new(provider, &Config::default())
}

#[test_log::test(tokio::test)]
async fn test_get_statement_is_idempotent() {
    init_test_logging();
    log_test_step("Two sequential requests hit the provider once");

    let provider = Arc::new(FakeProvider::new(0.9).with_ticker("AAPL", &["2023-09-30", "2024-09-28"]));
    let pipeline = pipeline_over(provider.clone());

    let first = pipeline.get_statement("AAPL").await.unwrap();
    let second = pipeline.get_statement("AAPL").await.unwrap();

    assert_eq!(*first, *second);
    assert_eq!(provider.balance_sheet_calls(), 1);
    assert_eq!(provider.rate_calls(), 1);
    log_test_data("Periods", &first.periods);

    // 300 USD equity at 0.9
    let equity = first.value("Eigenkapital", "2024").unwrap();
    assert!((equity - 270.0).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_concurrent_first_requests_share_one_run() {
    init_test_logging();
    log_test_step("Two overlapping requests for X run the pipeline once");

    let provider = Arc::new(
        FakeProvider::new(1.0)
            .with_ticker("X", &["2024-12-31"])
            .with_delay(Duration::from_millis(100)),
    );
    let pipeline = pipeline_over(provider.clone());

    let (a, b) = tokio::join!(pipeline.get_statement("X"), pipeline.get_statement("X"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(provider.balance_sheet_calls(), 1);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test_log::test(tokio::test)]
async fn test_failed_ticker_is_retried_on_next_request() {
    let provider = Arc::new(FakeProvider::new(1.0));
    let pipeline = pipeline_over(provider.clone());

    assert_matches!(
        pipeline.get_statement("NOPE").await,
        Err(PipelineError::DataUnavailable { ticker, .. }) if ticker == "NOPE"
    );
    assert!(pipeline.get_statement("NOPE").await.is_err());
    assert_eq!(provider.balance_sheet_calls(), 2);
    assert_eq!(provider.rate_calls(), 0);
}

#[test_log::test(tokio::test)]
async fn test_schema_drift_reports_missing_items() {
    let statement = create_raw_statement_without("BANK", &["2024-12-31"], LineItem::Inventory);
    let provider = Arc::new(FakeProvider::new(1.0).with_statement(statement));
    let pipeline = pipeline_over(provider.clone());

    let err = pipeline.get_statement("BANK").await.unwrap_err();
    assert_matches!(err, PipelineError::MissingLineItems { ref items, .. } if items == &vec!["Inventory".to_string()]);
    assert_eq!(provider.rate_calls(), 0);
}

#[test_log::test(tokio::test)]
async fn test_batch_with_failing_ticker_returns_the_others() {
    init_test_logging();
    log_test_step("One unknown ticker does not fail the batch");

    let provider = Arc::new(
        FakeProvider::new(1.0)
            .with_ticker("AAPL", &["2023-09-30"])
            .with_ticker("MSFT", &["2023-06-30"]),
    );
    let pipeline = pipeline_over(provider);
    let tickers = vec!["AAPL".to_string(), "NOPE".to_string(), "MSFT".to_string()];

    let result = fetch_statements_concurrently(&pipeline, &tickers, &ConcurrentFetchConfig::default())
        .await
        .unwrap();
    log_test_data("Batch result", &(result.succeeded, result.failed));

    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    let names: Vec<String> = result.statements().into_iter().map(|(t, _)| t).collect();
    assert_eq!(names, vec!["AAPL", "MSFT"]);
    assert_eq!(result.failures()[0].0, "NOPE");
}

#[test_log::test(tokio::test)]
async fn test_empty_batch_runs_nothing() {
    let provider = Arc::new(FakeProvider::new(1.0).with_ticker("AAPL", &["2023-09-30"]));
    let pipeline = pipeline_over(provider.clone());

    let result = fetch_statements_concurrently(&pipeline, &[], &ConcurrentFetchConfig::default()).await;
    assert_matches!(result, Err(PipelineError::EmptyInput));
    assert_eq!(provider.balance_sheet_calls(), 0);
}
