//! Per-ticker balance-sheet pipeline with memoization
//!
//! Fetch → normalize → convert → derive KPIs → translate, executed at most
//! once per ticker for the lifetime of the pipeline.

use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{self, CleanupPolicy};
use crate::api::StatementProvider;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{Config, DisplayStatement};
use crate::statement_cache::StatementCache;

pub type DisplayCache = StatementCache<DisplayStatement, PipelineError>;

pub struct StatementPipeline {
    provider: Arc<dyn StatementProvider>,
    cache: Arc<DisplayCache>,
    cleanup_policy: CleanupPolicy,
    fx_base_currency: String,
    fx_quote_currency: String,
}

impl StatementPipeline {
    /// Create a pipeline with its own cache sized from the configuration
    pub fn new(provider: Arc<dyn StatementProvider>, config: &Config) -> Self {
        let cache = Arc::new(DisplayCache::new(config.cache_capacity));
        Self::with_cache(provider, cache, config)
    }

    /// Create a pipeline around an existing cache
    pub fn with_cache(provider: Arc<dyn StatementProvider>, cache: Arc<DisplayCache>, config: &Config) -> Self {
        Self {
            provider,
            cache,
            cleanup_policy: config.cleanup_policy,
            fx_base_currency: config.fx_base_currency.clone(),
            fx_quote_currency: config.fx_quote_currency.clone(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn StatementProvider> {
        &self.provider
    }

    pub fn cache(&self) -> &Arc<DisplayCache> {
        &self.cache
    }

    /// Display-ready statement for `ticker`, computed on first request only.
    ///
    /// The ticker is used verbatim as cache key; callers canonicalize case.
    pub async fn get_statement(&self, ticker: &str) -> PipelineResult<Arc<DisplayStatement>> {
        let provider = Arc::clone(&self.provider);
        let ticker_owned = ticker.to_string();
        let policy = self.cleanup_policy;
        let base = self.fx_base_currency.clone();
        let quote = self.fx_quote_currency.clone();

        self.cache
            .get_or_load(ticker, move || run_pipeline(provider, ticker_owned, policy, base, quote))
            .await
    }
}

/// One uncached pipeline run
async fn run_pipeline(
    provider: Arc<dyn StatementProvider>,
    ticker: String,
    policy: CleanupPolicy,
    base: String,
    quote: String,
) -> PipelineResult<DisplayStatement> {
    info!("🔄 Running balance sheet pipeline for {}", ticker);

    let raw = provider.fetch_balance_sheet(&ticker).await?;
    let normalized = analysis::normalize(&raw, policy)?;

    let rate = provider.fetch_exchange_rate(&base, &quote).await?;
    let converted = analysis::convert(&normalized, rate)?;
    debug!("Converted {} from {} to {} at {:.4}", ticker, base, quote, rate);

    let annotated = analysis::derive_kpis(&converted);
    let statement = analysis::translate(&annotated);

    info!(
        "✅ Pipeline finished for {} ({} rows, {} periods)",
        ticker,
        statement.rows.len(),
        statement.periods.len()
    );
    Ok(statement)
}
