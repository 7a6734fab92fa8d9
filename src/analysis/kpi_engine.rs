//! Balance-sheet KPI derivation
//!
//! Appends the twelve [`Kpi`] rows to a converted statement. Percent KPIs
//! are scaled to 0..100. A missing operand or a zero denominator produces a
//! missing cell, never an error.

use tracing::debug;

use crate::models::{AnnotatedStatement, Kpi, LineItem, StatementTable};

/// Base line items of one period
#[derive(Debug, Clone, Copy, Default)]
struct PeriodValues {
    non_current_assets: Option<f64>,
    current_assets: Option<f64>,
    inventory: Option<f64>,
    receivables: Option<f64>,
    cash: Option<f64>,
    equity: Option<f64>,
    total_liabilities: Option<f64>,
    current_liabilities: Option<f64>,
    non_current_liabilities: Option<f64>,
}

impl PeriodValues {
    fn from_table(table: &StatementTable, idx: usize) -> Self {
        let get = |item: LineItem| {
            table
                .row(item.name())
                .and_then(|row| row.values.get(idx).copied().flatten())
        };

        Self {
            non_current_assets: get(LineItem::TotalNonCurrentAssets),
            current_assets: get(LineItem::CurrentAssets),
            inventory: get(LineItem::Inventory),
            receivables: get(LineItem::Receivables),
            cash: get(LineItem::CashAndShortTermInvestments),
            equity: get(LineItem::StockholdersEquity),
            total_liabilities: get(LineItem::TotalLiabilities),
            current_liabilities: get(LineItem::CurrentLiabilities),
            non_current_liabilities: get(LineItem::NonCurrentLiabilities),
        }
    }

    fn total_assets(&self) -> Option<f64> {
        add(self.current_assets, self.non_current_assets)
    }

    fn total_capital(&self) -> Option<f64> {
        add(self.equity, self.total_liabilities)
    }

    fn kpi(&self, kpi: Kpi) -> Option<f64> {
        match kpi {
            Kpi::EquityRatio => percent(divide(self.equity, self.total_capital())),
            Kpi::DebtRatio => percent(divide(self.total_liabilities, self.total_capital())),
            Kpi::StaticDebtRatio => percent(divide(self.total_liabilities, self.equity)),
            Kpi::FixedAssetIntensity => divide(self.non_current_assets, self.total_assets()),
            Kpi::CoverageRatio1 => divide(self.equity, self.non_current_assets),
            Kpi::CoverageRatio2 => divide(
                add(self.equity, self.non_current_liabilities),
                self.non_current_assets,
            ),
            Kpi::CurrentAssetRatio => divide(self.current_assets, self.total_assets()),
            Kpi::ReceivablesRatio => divide(self.receivables, self.total_assets()),
            Kpi::LiquidityRatio1 => divide(self.current_assets, self.current_liabilities),
            Kpi::LiquidityRatio2 => divide(
                subtract(self.current_assets, self.inventory),
                self.current_liabilities,
            ),
            Kpi::LiquidityRatio3 => divide(self.cash, self.current_liabilities),
            Kpi::NetWorkingCapital => subtract(self.current_assets, self.current_liabilities),
        }
    }
}

fn add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? + b?)
}

fn subtract(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

fn divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let result = n / d;
    result.is_finite().then_some(result)
}

fn percent(ratio: Option<f64>) -> Option<f64> {
    ratio.map(|r| r * 100.0)
}

/// Compute every KPI for every period and append them as new rows
pub fn derive_kpis(statement: &StatementTable) -> AnnotatedStatement {
    let mut annotated = statement.clone();
    let per_period: Vec<PeriodValues> = (0..statement.periods.len())
        .map(|idx| PeriodValues::from_table(statement, idx))
        .collect();

    for kpi in Kpi::ALL {
        let values: Vec<Option<f64>> = per_period.iter().map(|p| p.kpi(kpi)).collect();
        annotated.push_row(kpi.name(), values);
    }

    debug!(
        "Derived {} KPIs for {} over {} periods",
        Kpi::ALL.len(),
        statement.ticker,
        statement.periods.len()
    );
    annotated
}
