//! Ratio line charts over all fiscal years of the requested tickers

use serde::Serialize;

use super::{ticker_color, year_axis, LineDash, TickerStatements};
use crate::analysis::translator::kpi_label;
use crate::models::{Kpi, KpiUnit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub ticker: String,
    pub color: String,
    pub dash: LineDash,
    pub unit: KpiUnit,
    /// Aligned with the chart's x axis; `None` is a gap
    pub y: Vec<Option<f64>>,
}

/// Series shown together; a chart with several groups shows one at a time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroup {
    pub label: String,
    pub visible: bool,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub legend_title: String,
    pub x: Vec<String>,
    pub groups: Vec<SeriesGroup>,
}

impl LineChart {
    fn new(title: &str, y_axis_title: &str, x: Vec<String>, groups: Vec<SeriesGroup>) -> Self {
        Self {
            title: title.to_string(),
            x_axis_title: "Jahr".to_string(),
            y_axis_title: y_axis_title.to_string(),
            legend_title: "Unternehmen".to_string(),
            x,
            groups,
        }
    }

    pub fn visible_group(&self) -> Option<&SeriesGroup> {
        self.groups.iter().find(|group| group.visible)
    }
}

/// Equity ratio, debt ratio and static debt ratio as three switchable groups.
///
/// `requested` is the full ticker list of the request; a ticker keeps the
/// color of its request position even when earlier tickers failed.
pub fn build_leverage_chart(statements: &TickerStatements, requested: &[String]) -> LineChart {
    let x = year_axis(statements);
    let groups = [Kpi::EquityRatio, Kpi::DebtRatio, Kpi::StaticDebtRatio]
        .iter()
        .enumerate()
        .map(|(i, kpi)| SeriesGroup {
            label: kpi_label(*kpi).to_string(),
            visible: i == 0,
            series: kpi_series(statements, requested, &x, *kpi, LineDash::Solid),
        })
        .collect();

    LineChart::new(
        "Eigenkapitalquote, Fremdkapitalquote und Statischer Verschuldungsgrad",
        "Quote (%)",
        x,
        groups,
    )
}

pub fn build_coverage_chart(statements: &TickerStatements, requested: &[String]) -> LineChart {
    let x = year_axis(statements);
    let series = styled_series(
        statements,
        requested,
        &x,
        &[(Kpi::CoverageRatio1, LineDash::Solid), (Kpi::CoverageRatio2, LineDash::Dash)],
    );

    LineChart::new(
        "1. und 2. Anlagendeckung im Zeitverlauf",
        "Anlagendeckungsgrad",
        x,
        vec![single_group("Anlagendeckungsgrade", series)],
    )
}

pub fn build_liquidity_chart(statements: &TickerStatements, requested: &[String]) -> LineChart {
    let x = year_axis(statements);
    let series = styled_series(
        statements,
        requested,
        &x,
        &[
            (Kpi::LiquidityRatio1, LineDash::Solid),
            (Kpi::LiquidityRatio2, LineDash::Dash),
            (Kpi::LiquidityRatio3, LineDash::Dot),
        ],
    );

    LineChart::new(
        "1., 2. und 3. Liquiditätsgrade im Zeitverlauf",
        "Liquiditätsgrad",
        x,
        vec![single_group("Liquiditätsgrade", series)],
    )
}

fn single_group(label: &str, series: Vec<LineSeries>) -> SeriesGroup {
    SeriesGroup {
        label: label.to_string(),
        visible: true,
        series,
    }
}

/// One series per ticker and KPI, grouped by KPI
fn styled_series(
    statements: &TickerStatements,
    requested: &[String],
    x: &[String],
    styles: &[(Kpi, LineDash)],
) -> Vec<LineSeries> {
    styles
        .iter()
        .flat_map(|(kpi, dash)| kpi_series(statements, requested, x, *kpi, *dash))
        .collect()
}

fn kpi_series(
    statements: &TickerStatements,
    requested: &[String],
    x: &[String],
    kpi: Kpi,
    dash: LineDash,
) -> Vec<LineSeries> {
    let label = kpi_label(kpi);
    statements
        .iter()
        .enumerate()
        .map(|(i, (ticker, statement))| LineSeries {
            name: format!("{} {}", ticker, label),
            ticker: ticker.clone(),
            color: ticker_color(requested.iter().position(|t| t == ticker).unwrap_or(i)).to_string(),
            dash,
            unit: kpi.unit(),
            y: x.iter().map(|year| statement.value(label, year)).collect(),
        })
        .collect()
}
