//! Strukturbilanz: condensed two-sided balance sheet per ticker and year

use serde::Serialize;
use tracing::info;

use super::{format_eur, sum_all, TickerStatements};
use crate::analysis::translator::line_item_label;
use crate::models::{FiscalPeriod, LineItem, StatementTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceLine {
    pub label: String,
    pub value: Option<f64>,
    pub formatted: String,
}

impl BalanceLine {
    fn new(label: &str, value: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            value,
            formatted: format_eur(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralYear {
    pub year: String,
    pub title: String,
    pub assets: Vec<BalanceLine>,
    pub liabilities: Vec<BalanceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralSection {
    pub ticker: String,
    pub title: String,
    /// Latest year first
    pub years: Vec<StructuralYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralReport {
    pub sections: Vec<StructuralSection>,
    /// Tickers without any of the display years
    pub skipped: Vec<String>,
}

pub fn build_structural_balance_sheets(statements: &TickerStatements, display_years: &[String]) -> StructuralReport {
    let mut sections = Vec::new();
    let mut skipped = Vec::new();

    for (ticker, statement) in statements {
        let years: Vec<FiscalPeriod> = statement
            .periods_descending()
            .into_iter()
            .filter(|period| display_years.iter().any(|year| year == period.as_str()))
            .collect();

        if years.is_empty() {
            info!("⚠️ No balance sheet data for {} in {:?}, skipping", ticker, display_years);
            skipped.push(ticker.clone());
            continue;
        }

        sections.push(StructuralSection {
            ticker: ticker.clone(),
            title: format!("Strukturbilanz für {}", ticker),
            years: years
                .iter()
                .map(|year| structural_year(ticker, statement, year.as_str()))
                .collect(),
        });
    }

    StructuralReport { sections, skipped }
}

fn structural_year(ticker: &str, statement: &StatementTable, year: &str) -> StructuralYear {
    let get = |item: LineItem| statement.value(line_item_label(item), year);

    let fixed_assets = get(LineItem::TotalNonCurrentAssets);
    let current_assets = get(LineItem::CurrentAssets);
    let equity = get(LineItem::StockholdersEquity);
    let long_term = get(LineItem::NonCurrentLiabilities);
    let short_term = get(LineItem::CurrentLiabilities);

    StructuralYear {
        year: year.to_string(),
        title: format!("Strukturbilanz von {} – Jahr {}", ticker, year),
        assets: vec![
            BalanceLine::new("Anlagevermögen", fixed_assets),
            BalanceLine::new("Umlaufvermögen", current_assets),
            BalanceLine::new("Summe Aktiva", sum_all(&[fixed_assets, current_assets])),
        ],
        liabilities: vec![
            BalanceLine::new("Eigenkapital", equity),
            BalanceLine::new("Langfristige Verbindlichkeiten", long_term),
            BalanceLine::new("Kurzfristige Verbindlichkeiten", short_term),
            BalanceLine::new("Summe Passiva", sum_all(&[equity, long_term, short_term])),
        ],
    }
}
