use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use tracing::{debug, info, warn};
use url::Url;

use super::StatementProvider;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CompanyInfo, Config, LineItem, RawStatement, RawValue, TickerSuggestion};

/// Yahoo Finance client
pub struct YahooClient {
    client: Client,
    base_url: String,
    history_years: u32,
    rate_limiter: DefaultDirectRateLimiter,
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; rust-balance-sheets/1.0)")
            .build()?;

        let per_minute = NonZeroU32::new(config.rate_limit_per_minute)
            .unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            client,
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            history_years: config.history_years,
            rate_limiter,
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)?;
        Ok(url)
    }

    /// Make a rate-limited GET request and return the JSON body
    async fn make_request(&self, url: Url) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        debug!("Making request to: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API request failed with status {}: {}", status, error_text));
        }

        let json: Value = response.json().await?;
        Ok(json)
    }

    async fn request_balance_sheet(&self, ticker: &str) -> Result<RawStatement> {
        let now = Utc::now();
        let start = now - Duration::days(365 * i64::from(self.history_years));
        let types = LineItem::ALL
            .iter()
            .map(|item| format!("annual{}", item.timeseries_field()))
            .collect::<Vec<_>>()
            .join(",");

        let url = self.url(
            &format!("/ws/fundamentals-timeseries/v1/finance/timeseries/{}", ticker),
            &[
                ("symbol", ticker.to_string()),
                ("type", types),
                ("period1", start.timestamp().to_string()),
                ("period2", now.timestamp().to_string()),
            ],
        )?;

        let data = self.make_request(url).await?;
        let statement = parse_timeseries(ticker, &data)?;

        if statement.is_empty() {
            return Err(anyhow!("provider returned no balance sheet rows"));
        }

        debug!(
            "Retrieved {} line items over {} periods for {}",
            statement.rows.len(),
            statement.period_labels().len(),
            ticker
        );
        Ok(statement)
    }

    async fn request_exchange_rate(&self, pair: &str) -> Result<f64> {
        let url = self.url(
            &format!("/v8/finance/chart/{}", pair),
            &[("range", "5d".to_string()), ("interval", "1d".to_string())],
        )?;

        let data = self.make_request(url).await?;
        parse_latest_close(&data).ok_or_else(|| anyhow!("no recent close in chart response"))
    }

    async fn request_company_info(&self, ticker: &str) -> Result<CompanyInfo> {
        let url = self.url(
            &format!("/v10/finance/quoteSummary/{}", ticker),
            &[("modules", "price,assetProfile".to_string())],
        )?;

        let data = self.make_request(url).await?;
        parse_company_info(ticker, &data)
    }

    async fn request_search(&self, query: &str) -> Result<Vec<TickerSuggestion>> {
        let url = self.url(
            "/v1/finance/search",
            &[
                ("q", query.to_string()),
                ("quotesCount", "10".to_string()),
                ("newsCount", "0".to_string()),
            ],
        )?;

        let data = self.make_request(url).await?;
        Ok(rank_suggestions(query, parse_search(&data)))
    }
}

#[async_trait::async_trait]
impl StatementProvider for YahooClient {
    async fn fetch_balance_sheet(&self, ticker: &str) -> PipelineResult<RawStatement> {
        self.request_balance_sheet(ticker).await.map_err(|e| {
            warn!("Balance sheet request for {} failed: {}", ticker, e);
            PipelineError::data_unavailable(ticker, e)
        })
    }

    async fn fetch_exchange_rate(&self, base: &str, quote: &str) -> PipelineResult<f64> {
        let pair = format!("{}{}=X", base, quote);
        let rate = self
            .request_exchange_rate(&pair)
            .await
            .map_err(|e| PipelineError::rate_unavailable(&pair, e))?;
        info!("💱 {} rate: {:.4}", pair, rate);
        Ok(rate)
    }

    async fn fetch_company_info(&self, ticker: &str) -> PipelineResult<CompanyInfo> {
        self.request_company_info(ticker)
            .await
            .map_err(|e| PipelineError::data_unavailable(ticker, e))
    }

    async fn search_tickers(&self, query: &str) -> PipelineResult<Vec<TickerSuggestion>> {
        self.request_search(query)
            .await
            .map_err(|e| PipelineError::data_unavailable(query, e))
    }
}

/// Build a raw statement from a fundamentals-timeseries response.
///
/// Series the provider omits entirely are left out so the normalizer can
/// report them as missing line items. `null` entries become explicit gaps.
fn parse_timeseries(ticker: &str, data: &Value) -> Result<RawStatement> {
    let timeseries = data
        .get("timeseries")
        .ok_or_else(|| anyhow!("response has no timeseries object"))?;

    if let Some(error) = timeseries.get("error").filter(|e| !e.is_null()) {
        return Err(anyhow!("provider error: {}", error));
    }

    let results = timeseries
        .get("result")
        .and_then(|r| r.as_array())
        .ok_or_else(|| anyhow!("response has no timeseries result"))?;

    let mut statement = RawStatement::new(ticker);

    for item in LineItem::ALL {
        let field = format!("annual{}", item.timeseries_field());
        let Some(series) = results.iter().find_map(|r| r.get(&field)).and_then(|s| s.as_array()) else {
            continue;
        };
        let timestamps = results
            .iter()
            .find(|r| r.get(&field).is_some())
            .and_then(|r| r.get("timestamp"))
            .and_then(|t| t.as_array());

        for (idx, entry) in series.iter().enumerate() {
            let label = entry
                .get("asOfDate")
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .or_else(|| {
                    timestamps
                        .and_then(|ts| ts.get(idx))
                        .and_then(|t| t.as_i64())
                        .and_then(|t| DateTime::from_timestamp(t, 0))
                        .map(|dt| dt.date_naive().to_string())
                });
            let Some(label) = label else {
                continue;
            };

            let value = match entry.get("reportedValue").and_then(|v| v.get("raw")) {
                Some(Value::Number(n)) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Missing),
                Some(Value::String(s)) => RawValue::Text(s.clone()),
                _ => RawValue::Missing,
            };
            statement.insert(item.name(), &label, value);
        }
    }

    Ok(statement)
}

/// Last non-null daily close, falling back to the regular market price
fn parse_latest_close(data: &Value) -> Option<f64> {
    let result = data.get("chart")?.get("result")?.as_array()?.first()?;

    let close = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|q| q.first())
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array())
        .and_then(|closes| closes.iter().rev().find_map(|c| c.as_f64()));

    close.or_else(|| {
        result
            .get("meta")
            .and_then(|m| m.get("regularMarketPrice"))
            .and_then(|p| p.as_f64())
    })
}

fn parse_company_info(ticker: &str, data: &Value) -> Result<CompanyInfo> {
    let result = data
        .get("quoteSummary")
        .and_then(|q| q.get("result"))
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| anyhow!("no quote summary for {}", ticker))?;

    let text = |module: &str, field: &str| {
        result
            .get(module)
            .and_then(|m| m.get(field))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    Ok(CompanyInfo {
        symbol: ticker.to_string(),
        short_name: text("price", "shortName"),
        sector: text("assetProfile", "sector"),
        country: text("assetProfile", "country"),
        full_time_employees: result
            .get("assetProfile")
            .and_then(|m| m.get("fullTimeEmployees"))
            .and_then(|v| v.as_i64()),
    })
}

fn parse_search(data: &Value) -> Vec<TickerSuggestion> {
    data.get("quotes")
        .and_then(|q| q.as_array())
        .map(|quotes| {
            quotes
                .iter()
                .filter_map(|quote| {
                    let symbol = quote.get("symbol")?.as_str()?.to_string();
                    let name = quote
                        .get("shortname")
                        .or_else(|| quote.get("longname"))
                        .and_then(|n| n.as_str())
                        .unwrap_or("Unbekannt")
                        .to_string();
                    Some(TickerSuggestion { symbol, name })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Order suggestions by fuzzy similarity to the query, best first
fn rank_suggestions(query: &str, suggestions: Vec<TickerSuggestion>) -> Vec<TickerSuggestion> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, TickerSuggestion)> = suggestions
        .into_iter()
        .map(|s| {
            let score = matcher
                .fuzzy_match(&format!("{} {}", s.symbol, s.name), query)
                .unwrap_or(i64::MIN);
            (score, s)
        })
        .collect();
    // Stable sort keeps the provider's order for equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, s)| s).collect()
}
