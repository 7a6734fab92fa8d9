use crate::error::PipelineResult;
use crate::models::{CompanyInfo, RawStatement, TickerSuggestion};

pub mod yahoo_client;
pub use yahoo_client::YahooClient;

/// Market-data capability the pipeline depends on.
///
/// Implementations perform network calls on every invocation; caching
/// happens one level up in the statement pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatementProvider: Send + Sync {
    /// Annual balance sheet keyed by line-item name and raw period label
    async fn fetch_balance_sheet(&self, ticker: &str) -> PipelineResult<RawStatement>;

    /// Most recent daily close of the `base`/`quote` currency pair
    async fn fetch_exchange_rate(&self, base: &str, quote: &str) -> PipelineResult<f64>;

    async fn fetch_company_info(&self, ticker: &str) -> PipelineResult<CompanyInfo>;

    async fn search_tickers(&self, query: &str) -> PipelineResult<Vec<TickerSuggestion>>;
}
