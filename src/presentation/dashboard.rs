//! Stacked capital-structure bars per ticker and display year

use serde::Serialize;
use tracing::debug;

use super::{sum_all, TickerStatements};
use crate::analysis::translator::line_item_label;
use crate::models::LineItem;

/// Stacked components with their fixed colors, bottom to top
const COMPONENTS: [(LineItem, &str); 3] = [
    (LineItem::StockholdersEquity, "#1f77b4"),
    (LineItem::NonCurrentLiabilities, "#ff7f0e"),
    (LineItem::CurrentLiabilities, "#2ca02c"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub name: String,
    pub color: String,
    pub value: Option<f64>,
    /// Share of the bar total, 0..100
    pub share_percent: Option<f64>,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBar {
    pub ticker: String,
    pub year: String,
    pub label: String,
    pub segments: Vec<BarSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub legend_title: String,
    pub bars: Vec<StackedBar>,
}

pub fn build_dashboard(statements: &TickerStatements, display_years: &[String]) -> StackedBarChart {
    let mut bars = Vec::new();

    for (ticker, statement) in statements {
        for year in display_years {
            if !statement.has_period(year) {
                debug!("No {} column for {}, leaving bar out", year, ticker);
                continue;
            }

            let values: Vec<Option<f64>> = COMPONENTS
                .iter()
                .map(|(item, _)| statement.value(line_item_label(*item), year))
                .collect();
            let total = sum_all(&values);
            let show_legend = bars.is_empty();

            let segments = COMPONENTS
                .iter()
                .zip(&values)
                .map(|((item, color), value)| BarSegment {
                    name: line_item_label(*item).to_string(),
                    color: color.to_string(),
                    value: *value,
                    share_percent: share(*value, total),
                    show_legend,
                })
                .collect();

            bars.push(StackedBar {
                ticker: ticker.clone(),
                year: year.clone(),
                label: format!("{} {}", ticker, year),
                segments,
            });
        }
    }

    StackedBarChart {
        title: format!(
            "Kapital und Verbindlichkeiten der Unternehmen ({})",
            display_years.join(" vs ")
        ),
        x_axis_title: "Unternehmen und Jahr".to_string(),
        y_axis_title: "Betrag (€)".to_string(),
        legend_title: "Komponenten".to_string(),
        bars,
    }
}

fn share(value: Option<f64>, total: Option<f64>) -> Option<f64> {
    let (value, total) = (value?, total?);
    if total == 0.0 {
        return None;
    }
    Some(value * 100.0 / total)
}
