//! Concurrent statement fetching module
//!
//! Runs the per-ticker pipeline for a batch of tickers with a bounded number
//! of concurrent pipeline runs. One failing ticker never fails the batch.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{Config, DisplayStatement};
use crate::pipeline::StatementPipeline;

/// Configuration for concurrent fetching
#[derive(Debug, Clone)]
pub struct ConcurrentFetchConfig {
    pub max_concurrent: usize,
}

impl ConcurrentFetchConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent: config.max_concurrent_fetches.max(1),
        }
    }
}

impl Default for ConcurrentFetchConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// Outcome for one requested ticker
#[derive(Debug, Clone)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: PipelineResult<Arc<DisplayStatement>>,
}

/// Result of a concurrent batch, in request order
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub total_tickers: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<TickerOutcome>,
}

impl FetchResult {
    /// Successful statements, in request order
    pub fn statements(&self) -> Vec<(String, Arc<DisplayStatement>)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (o.ticker.clone(), Arc::clone(s))))
            .collect()
    }

    /// Failed tickers with their errors, in request order
    pub fn failures(&self) -> Vec<(String, PipelineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.ticker.clone(), e.clone())))
            .collect()
    }
}

/// Fetch statements for all tickers concurrently
pub async fn fetch_statements_concurrently(
    pipeline: &StatementPipeline,
    tickers: &[String],
    config: &ConcurrentFetchConfig,
) -> PipelineResult<FetchResult> {
    if tickers.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let max_concurrent = config.max_concurrent.max(1);
    info!("🚀 Fetching {} tickers with up to {} concurrent pipelines", tickers.len(), max_concurrent);

    let outcomes: Vec<TickerOutcome> = stream::iter(tickers.iter().cloned())
        .map(|ticker| async move {
            let result = pipeline.get_statement(&ticker).await;
            match &result {
                Ok(statement) => debug!("✅ Completed {} ({} periods)", ticker, statement.periods.len()),
                Err(e) => error!("❌ Failed {} - {}", ticker, e),
            }
            TickerOutcome { ticker, result }
        })
        .buffered(max_concurrent)
        .collect()
        .await;

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    let result = FetchResult {
        total_tickers: outcomes.len(),
        succeeded,
        failed: outcomes.len() - succeeded,
        outcomes,
    };

    info!("📊 Results: {} succeeded, {} failed", result.succeeded, result.failed);
    Ok(result)
}
