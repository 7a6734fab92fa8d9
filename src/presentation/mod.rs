//! Chart and table descriptions built from finished display statements.
//!
//! Nothing here renders; every builder returns a serializable structure a
//! front end can draw directly. Missing values stay `None` and serialize as
//! `null` so charts show gaps instead of zeros.

pub mod company_table;
pub mod dashboard;
pub mod ratio_charts;
pub mod structural;

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::{DisplayStatement, FiscalPeriod};

pub use company_table::{build_company_table, CompanyTable};
pub use dashboard::{build_dashboard, StackedBarChart};
pub use ratio_charts::{build_coverage_chart, build_leverage_chart, build_liquidity_chart, LineChart};
pub use structural::{build_structural_balance_sheets, StructuralReport};

/// Statements of the successfully processed tickers, in request order
pub type TickerStatements = [(String, Arc<DisplayStatement>)];

/// Per-ticker line colors, cycled when more tickers are requested
pub const TICKER_COLORS: [&str; 5] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];

pub fn ticker_color(index: usize) -> &'static str {
    TICKER_COLORS[index % TICKER_COLORS.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
    Dot,
}

/// Ascending union of every statement's fiscal years
pub fn year_axis(statements: &TickerStatements) -> Vec<String> {
    let years: BTreeSet<FiscalPeriod> = statements
        .iter()
        .flat_map(|(_, statement)| statement.periods.iter().cloned())
        .collect();
    years.into_iter().map(|p| p.to_string()).collect()
}

/// Format a euro amount with thousands separators and no decimals
pub fn format_eur(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "n/a".to_string();
    };

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{} €", grouped)
    } else {
        format!("{} €", grouped)
    }
}

/// Sum of all parts, missing if any part is missing
pub(crate) fn sum_all(parts: &[Option<f64>]) -> Option<f64> {
    parts.iter().copied().sum()
}
