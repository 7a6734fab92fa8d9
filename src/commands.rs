//! Inbound command boundary
//!
//! Takes a list of ticker symbols plus an operation, runs the cached pipeline
//! for every ticker and hands the successful statements to the matching
//! presentation builder. Per-ticker failures travel next to the payload; the
//! request only fails as a whole when the input is unusable or no ticker
//! could be processed.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

use crate::concurrent_fetcher::{fetch_statements_concurrently, ConcurrentFetchConfig};
use crate::error::PipelineError;
use crate::models::{CompanyInfo, Config, TickerSuggestion};
use crate::pipeline::StatementPipeline;
use crate::presentation::{
    build_company_table, build_coverage_chart, build_dashboard, build_leverage_chart,
    build_liquidity_chart, build_structural_balance_sheets, CompanyTable, LineChart,
    StackedBarChart, StructuralReport,
};

const MAX_TICKER_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CompanyInfo,
    StructuralBalanceSheet,
    Dashboard,
    LeverageChart,
    CoverageChart,
    LiquidityChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    CompanyTable(CompanyTable),
    StructuralBalanceSheet(StructuralReport),
    Dashboard(StackedBarChart),
    LineChart(LineChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub error: String,
}

impl TickerFailure {
    fn new(ticker: &str, error: &PipelineError) -> Self {
        Self {
            ticker: ticker.to_string(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub operation: Operation,
    pub payload: Payload,
    pub failures: Vec<TickerFailure>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Keine Symbole angegeben")]
    EmptyInput,
    #[error("Ungültiges Ticker-Symbol: {0:?}")]
    InvalidTicker(String),
    #[error("Keine Daten für die angegebenen Symbole verfügbar")]
    AllTickersFailed(Vec<TickerFailure>),
}

impl CommandError {
    /// HTTP-style status for a request layer
    pub fn status_code(&self) -> u16 {
        match self {
            CommandError::EmptyInput | CommandError::InvalidTicker(_) => 400,
            CommandError::AllTickersFailed(_) => 502,
        }
    }
}

/// Error payload returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&CommandError> for ErrorBody {
    fn from(err: &CommandError) -> Self {
        Self { error: err.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickerValidity {
    pub is_valid: bool,
}

pub struct CommandHandler {
    pipeline: StatementPipeline,
    fetch_config: ConcurrentFetchConfig,
    display_years: Vec<String>,
}

impl CommandHandler {
    pub fn new(pipeline: StatementPipeline, config: &Config) -> Self {
        Self {
            pipeline,
            fetch_config: ConcurrentFetchConfig::from_config(config),
            display_years: config.display_years.clone(),
        }
    }

    pub fn pipeline(&self) -> &StatementPipeline {
        &self.pipeline
    }

    pub async fn handle(&self, request: &CommandRequest) -> Result<CommandResponse, CommandError> {
        let tickers = canonical_tickers(&request.symbols)?;
        info!("📥 {:?} for {}", request.operation, tickers.join(", "));

        let (payload, failures) = match request.operation {
            Operation::CompanyInfo => {
                let (companies, failures) = self.fetch_company_infos(&tickers).await;
                ensure_any_succeeded(companies.len(), &failures)?;
                (Payload::CompanyTable(build_company_table(&companies)), failures)
            }
            operation => {
                let result = fetch_statements_concurrently(&self.pipeline, &tickers, &self.fetch_config)
                    .await
                    .map_err(|_| CommandError::EmptyInput)?;
                let failures: Vec<TickerFailure> = result
                    .failures()
                    .iter()
                    .map(|(ticker, err)| TickerFailure::new(ticker, err))
                    .collect();
                let statements = result.statements();
                ensure_any_succeeded(statements.len(), &failures)?;

                let payload = match operation {
                    Operation::StructuralBalanceSheet => Payload::StructuralBalanceSheet(
                        build_structural_balance_sheets(&statements, &self.display_years),
                    ),
                    Operation::Dashboard => Payload::Dashboard(build_dashboard(&statements, &self.display_years)),
                    Operation::LeverageChart => Payload::LineChart(build_leverage_chart(&statements, &tickers)),
                    Operation::CoverageChart => Payload::LineChart(build_coverage_chart(&statements, &tickers)),
                    Operation::LiquidityChart => Payload::LineChart(build_liquidity_chart(&statements, &tickers)),
                    Operation::CompanyInfo => unreachable!("company info does not use statements"),
                };
                (payload, failures)
            }
        };

        Ok(CommandResponse {
            operation: request.operation,
            payload,
            failures,
        })
    }

    /// Whether the provider has a non-empty balance sheet for `ticker`; never fails
    pub async fn check_ticker(&self, ticker: &str) -> TickerValidity {
        let ticker = ticker.trim().to_uppercase();
        if !is_well_formed(&ticker) {
            return TickerValidity { is_valid: false };
        }

        let is_valid = match self.pipeline.provider().fetch_balance_sheet(&ticker).await {
            Ok(raw) => !raw.is_empty(),
            Err(e) => {
                info!("Ticker {} rejected: {}", ticker, e);
                false
            }
        };
        TickerValidity { is_valid }
    }

    /// Ticker suggestions for a free-text query; provider errors yield no suggestions
    pub async fn search_tickers(&self, query: &str) -> Vec<TickerSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.pipeline.provider().search_tickers(query).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("⚠️ Ticker search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn fetch_company_infos(&self, tickers: &[String]) -> (Vec<CompanyInfo>, Vec<TickerFailure>) {
        let provider = self.pipeline.provider();
        let results: Vec<(String, Result<CompanyInfo, PipelineError>)> = stream::iter(tickers.iter().cloned())
            .map(|ticker| async move {
                let result = provider.fetch_company_info(&ticker).await;
                (ticker, result)
            })
            .buffered(self.fetch_config.max_concurrent.max(1))
            .collect()
            .await;

        let mut companies = Vec::new();
        let mut failures = Vec::new();
        for (ticker, result) in results {
            match result {
                Ok(info) => companies.push(info),
                Err(e) => {
                    warn!("❌ No company info for {}: {}", ticker, e);
                    failures.push(TickerFailure::new(&ticker, &e));
                }
            }
        }
        (companies, failures)
    }
}

/// Trim, upper-case, validate and de-duplicate the requested symbols
fn canonical_tickers(symbols: &[String]) -> Result<Vec<String>, CommandError> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for symbol in symbols {
        let ticker = symbol.trim().to_uppercase();
        if ticker.is_empty() {
            continue;
        }
        if !is_well_formed(&ticker) {
            return Err(CommandError::InvalidTicker(symbol.clone()));
        }
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }

    if tickers.is_empty() {
        return Err(CommandError::EmptyInput);
    }
    Ok(tickers)
}

fn is_well_formed(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

fn ensure_any_succeeded(succeeded: usize, failures: &[TickerFailure]) -> Result<(), CommandError> {
    if succeeded == 0 {
        return Err(CommandError::AllTickersFailed(failures.to_vec()));
    }
    Ok(())
}
