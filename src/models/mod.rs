use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::normalizer::CleanupPolicy;

/// Raw cell as delivered by the market-data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

/// Balance sheet exactly as received from the provider.
///
/// Rows are keyed by the provider's line-item name, columns by the provider's
/// raw period label (usually an ISO date such as `2023-09-30`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatement {
    pub ticker: String,
    pub rows: BTreeMap<String, BTreeMap<String, RawValue>>,
}

impl RawStatement {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            rows: BTreeMap::new(),
        }
    }

    /// Insert or replace a single cell
    pub fn insert(&mut self, line_item: &str, period_label: &str, value: RawValue) {
        self.rows
            .entry(line_item.to_string())
            .or_default()
            .insert(period_label.to_string(), value);
    }

    /// All distinct period labels across every row
    pub fn period_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .rows
            .values()
            .flat_map(|cells| cells.keys().cloned())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(|cells| cells.is_empty())
    }
}

/// The nine balance-sheet line items every statement is projected onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineItem {
    TotalNonCurrentAssets,
    CurrentAssets,
    Inventory,
    Receivables,
    CashAndShortTermInvestments,
    StockholdersEquity,
    TotalLiabilities,
    CurrentLiabilities,
    NonCurrentLiabilities,
}

impl LineItem {
    pub const ALL: [LineItem; 9] = [
        LineItem::TotalNonCurrentAssets,
        LineItem::CurrentAssets,
        LineItem::Inventory,
        LineItem::Receivables,
        LineItem::CashAndShortTermInvestments,
        LineItem::StockholdersEquity,
        LineItem::TotalLiabilities,
        LineItem::CurrentLiabilities,
        LineItem::NonCurrentLiabilities,
    ];

    /// Canonical row key, identical to the provider vocabulary
    pub fn name(&self) -> &'static str {
        match self {
            LineItem::TotalNonCurrentAssets => "Total Non Current Assets",
            LineItem::CurrentAssets => "Current Assets",
            LineItem::Inventory => "Inventory",
            LineItem::Receivables => "Receivables",
            LineItem::CashAndShortTermInvestments => "Cash Cash Equivalents And Short Term Investments",
            LineItem::StockholdersEquity => "Stockholders Equity",
            LineItem::TotalLiabilities => "Total Liabilities Net Minority Interest",
            LineItem::CurrentLiabilities => "Current Liabilities",
            LineItem::NonCurrentLiabilities => "Total Non Current Liabilities Net Minority Interest",
        }
    }

    /// Field name used by the fundamentals timeseries endpoint (spaces removed)
    pub fn timeseries_field(&self) -> String {
        self.name().replace(' ', "")
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit a KPI value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KpiUnit {
    /// Scaled to 0..100
    Percent,
    Ratio,
    Currency,
}

/// Derived balance-sheet ratios, in computation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kpi {
    EquityRatio,
    DebtRatio,
    StaticDebtRatio,
    FixedAssetIntensity,
    CoverageRatio1,
    CoverageRatio2,
    CurrentAssetRatio,
    ReceivablesRatio,
    LiquidityRatio1,
    LiquidityRatio2,
    LiquidityRatio3,
    NetWorkingCapital,
}

impl Kpi {
    pub const ALL: [Kpi; 12] = [
        Kpi::EquityRatio,
        Kpi::DebtRatio,
        Kpi::StaticDebtRatio,
        Kpi::FixedAssetIntensity,
        Kpi::CoverageRatio1,
        Kpi::CoverageRatio2,
        Kpi::CurrentAssetRatio,
        Kpi::ReceivablesRatio,
        Kpi::LiquidityRatio1,
        Kpi::LiquidityRatio2,
        Kpi::LiquidityRatio3,
        Kpi::NetWorkingCapital,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Kpi::EquityRatio => "Equity_Ratio",
            Kpi::DebtRatio => "Debt_Ratio",
            Kpi::StaticDebtRatio => "Static_Debt_Ratio",
            Kpi::FixedAssetIntensity => "Fixed_Asset_Intensity",
            Kpi::CoverageRatio1 => "Coverage_Ratio_1",
            Kpi::CoverageRatio2 => "Coverage_Ratio_2",
            Kpi::CurrentAssetRatio => "Current_Asset_Ratio",
            Kpi::ReceivablesRatio => "Receivables_Ratio",
            Kpi::LiquidityRatio1 => "Liquidity_Ratio_1",
            Kpi::LiquidityRatio2 => "Liquidity_Ratio_2",
            Kpi::LiquidityRatio3 => "Liquidity_Ratio_3",
            Kpi::NetWorkingCapital => "Net_Working_Capital",
        }
    }

    pub fn unit(&self) -> KpiUnit {
        match self {
            Kpi::EquityRatio | Kpi::DebtRatio | Kpi::StaticDebtRatio => KpiUnit::Percent,
            Kpi::NetWorkingCapital => KpiUnit::Currency,
            _ => KpiUnit::Ratio,
        }
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four-character fiscal year label, e.g. `"2023"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalPeriod(String);

impl FiscalPeriod {
    /// Truncate a provider period label to its first four characters
    pub fn from_label(label: &str) -> Self {
        FiscalPeriod(label.trim().chars().take(4).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> Option<i32> {
        self.0.parse().ok()
    }
}

impl Ord for FiscalPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numeric years first, anything unparseable after them
        match (self.year(), other.year()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for FiscalPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FiscalPeriod {
    fn from(label: &str) -> Self {
        FiscalPeriod::from_label(label)
    }
}

/// One named row of a statement, aligned with the table's periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Line items (and later KPIs) over fiscal periods, ascending by year.
///
/// `None` marks a missing value. Every pipeline stage produces a new table
/// instead of mutating its input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub ticker: String,
    pub periods: Vec<FiscalPeriod>,
    pub rows: Vec<StatementRow>,
}

pub type NormalizedStatement = StatementTable;
pub type ConvertedStatement = StatementTable;
pub type AnnotatedStatement = StatementTable;
pub type DisplayStatement = StatementTable;

impl StatementTable {
    pub fn new(ticker: &str, periods: Vec<FiscalPeriod>) -> Self {
        Self {
            ticker: ticker.to_string(),
            periods,
            rows: Vec::new(),
        }
    }

    /// Append a row; values must line up with `periods`
    pub fn push_row(&mut self, key: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.periods.len());
        self.rows.push(StatementRow {
            key: key.to_string(),
            values,
        });
    }

    pub fn row(&self, key: &str) -> Option<&StatementRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn has_period(&self, period: &str) -> bool {
        self.period_index(period).is_some()
    }

    fn period_index(&self, period: &str) -> Option<usize> {
        self.periods.iter().position(|p| p.as_str() == period)
    }

    /// Value of `key` in `period`; `None` if the row, the period or the value is missing
    pub fn value(&self, key: &str, period: &str) -> Option<f64> {
        let idx = self.period_index(period)?;
        self.row(key).and_then(|row| row.values.get(idx).copied().flatten())
    }

    /// Full row for `key`, or an all-missing row if absent
    pub fn values_or_missing(&self, key: &str) -> Vec<Option<f64>> {
        self.row(key)
            .map(|row| row.values.clone())
            .unwrap_or_else(|| vec![None; self.periods.len()])
    }

    pub fn periods_ascending(&self) -> Vec<FiscalPeriod> {
        let mut periods = self.periods.clone();
        periods.sort();
        periods
    }

    /// Latest-first view used by tabular displays
    pub fn periods_descending(&self) -> Vec<FiscalPeriod> {
        let mut periods = self.periods_ascending();
        periods.reverse();
        periods
    }

    /// Copy of this table with every row key passed through `rename`
    pub fn map_keys<F>(&self, rename: F) -> StatementTable
    where
        F: Fn(&str) -> String,
    {
        StatementTable {
            ticker: self.ticker.clone(),
            periods: self.periods.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| StatementRow {
                    key: rename(&row.key),
                    values: row.values.clone(),
                })
                .collect(),
        }
    }

    /// Copy of this table with every present value passed through `f`
    pub fn map_values<F>(&self, f: F) -> StatementTable
    where
        F: Fn(f64) -> f64,
    {
        StatementTable {
            ticker: self.ticker.clone(),
            periods: self.periods.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| StatementRow {
                    key: row.key.clone(),
                    values: row.values.iter().map(|v| v.map(&f)).collect(),
                })
                .collect(),
        }
    }
}

/// General company information for the company table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub symbol: String,
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub full_time_employees: Option<i64>,
}

/// Candidate returned by ticker search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSuggestion {
    pub symbol: String,
    pub name: String,
}

/// Configuration for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider_base_url: String,
    pub fx_base_currency: String,
    pub fx_quote_currency: String,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
    pub cache_capacity: usize,
    pub cleanup_policy: CleanupPolicy,
    pub display_years: Vec<String>,
    pub history_years: u32,
}

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const MIN_CACHE_CAPACITY: usize = 128;

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            fx_base_currency: "USD".to_string(),
            fx_quote_currency: "EUR".to_string(),
            rate_limit_per_minute: 120,
            request_timeout_secs: 30,
            max_concurrent_fetches: 4,
            cache_capacity: MIN_CACHE_CAPACITY,
            cleanup_policy: CleanupPolicy::Coerce,
            display_years: vec!["2023".to_string(), "2024".to_string()],
            history_years: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup, falling back to defaults
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let cleanup_policy = match var("CLEANUP_POLICY") {
            Some(value) => value
                .parse::<CleanupPolicy>()
                .map_err(|e| anyhow::anyhow!("CLEANUP_POLICY: {}", e))?,
            None => defaults.cleanup_policy,
        };

        let display_years = var("DISPLAY_YEARS")
            .map(|value| {
                value
                    .split(',')
                    .map(|year| year.trim().to_string())
                    .filter(|year| !year.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.display_years);

        Ok(Config {
            provider_base_url: var("PROVIDER_BASE_URL").unwrap_or(defaults.provider_base_url),
            fx_base_currency: var("FX_BASE_CURRENCY").unwrap_or(defaults.fx_base_currency),
            fx_quote_currency: var("FX_QUOTE_CURRENCY").unwrap_or(defaults.fx_quote_currency),
            rate_limit_per_minute: var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|| "120".to_string())
                .parse()
                .unwrap_or(120),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .unwrap_or(30),
            max_concurrent_fetches: var("MAX_CONCURRENT_FETCHES")
                .unwrap_or_else(|| "4".to_string())
                .parse::<usize>()
                .unwrap_or(4)
                .max(1),
            cache_capacity: var("CACHE_CAPACITY")
                .unwrap_or_else(|| MIN_CACHE_CAPACITY.to_string())
                .parse::<usize>()
                .unwrap_or(MIN_CACHE_CAPACITY)
                .max(MIN_CACHE_CAPACITY),
            cleanup_policy,
            display_years,
            history_years: var("HISTORY_YEARS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .unwrap_or(10),
        })
    }

    /// Pseudo-ticker of the conversion pair, e.g. `USDEUR=X`
    pub fn fx_pair_symbol(&self) -> String {
        format!("{}{}=X", self.fx_base_currency, self.fx_quote_currency)
    }
}
