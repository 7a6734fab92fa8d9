//! Properties of the pure stages that must hold for any statement

use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::logging::{init_test_logging, log_test_step};
use crate::common::test_data::create_raw_statement;
use rust_balance_sheets::analysis::{self, CleanupPolicy};
use rust_balance_sheets::models::{Kpi, LineItem, RawStatement, RawValue, StatementTable};

/// Statement whose equity and liabilities vary per year, with gaps
fn varied_statement() -> RawStatement {
    let mut raw = create_raw_statement("VAR", &["2019-12-31", "2020-12-31", "2021-12-31", "2022-12-31"]);
    let equity = [Some(120.0), None, Some(0.5), Some(9_000.0)];
    let liabilities = [Some(880.0), Some(10.0), None, Some(3.0)];
    for (i, date) in ["2019-12-31", "2020-12-31", "2021-12-31", "2022-12-31"].iter().enumerate() {
        let to_raw = |v: Option<f64>| v.map(RawValue::Number).unwrap_or(RawValue::Missing);
        raw.insert(LineItem::StockholdersEquity.name(), date, to_raw(equity[i]));
        raw.insert(LineItem::TotalLiabilities.name(), date, to_raw(liabilities[i]));
    }
    raw
}

#[test]
fn test_interpolate_never_leaves_edges_missing() {
    init_test_logging();
    log_test_step("Interpolation fills first and last period of every line item");

    let mut raw = create_raw_statement("EDGE", &["2020-12-31", "2021-12-31", "2022-12-31"]);
    for item in LineItem::ALL {
        raw.insert(item.name(), "2020-12-31", RawValue::Missing);
        raw.insert(item.name(), "2022-12-31", RawValue::Text("-".to_string()));
    }

    let normalized = analysis::normalize(&raw, CleanupPolicy::Interpolate).unwrap();
    for row in &normalized.rows {
        assert!(row.values.first().copied().flatten().is_some(), "{} first", row.key);
        assert!(row.values.last().copied().flatten().is_some(), "{} last", row.key);
    }
    assert_eq!(normalized.value(LineItem::CurrentAssets.name(), "2020"), Some(0.0));
    assert_eq!(normalized.value(LineItem::CurrentAssets.name(), "2021"), Some(400.0));
}

#[test]
fn test_conversion_composes() {
    let normalized = analysis::normalize(&varied_statement(), CleanupPolicy::Coerce).unwrap();

    let twice = analysis::convert(&analysis::convert(&normalized, 0.9).unwrap(), 1.1).unwrap();
    let once = analysis::convert(&normalized, 0.9 * 1.1).unwrap();

    for (a, b) in twice.rows.iter().zip(&once.rows) {
        for (x, y) in a.values.iter().zip(&b.values) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() <= 1e-9 * y.abs().max(1.0)),
                (None, None) => {}
                _ => panic!("gap mismatch in {}", a.key),
            }
        }
    }
}

#[test]
fn test_equity_and_debt_ratio_sum_to_hundred() {
    let normalized = analysis::normalize(&varied_statement(), CleanupPolicy::Coerce).unwrap();
    let annotated = analysis::derive_kpis(&normalized);

    let mut checked = 0;
    for period in &annotated.periods {
        let equity = annotated.value(Kpi::EquityRatio.name(), period.as_str());
        let debt = annotated.value(Kpi::DebtRatio.name(), period.as_str());
        if let (Some(equity), Some(debt)) = (equity, debt) {
            assert!((equity + debt - 100.0).abs() < 1e-9, "{}: {} + {}", period, equity, debt);
            checked += 1;
        }
    }
    // 2019 and 2022 have both operands
    assert_eq!(checked, 2);
    assert_eq!(annotated.value(Kpi::EquityRatio.name(), "2020"), None);
}

#[test]
fn test_transform_output_shape() {
    let raw = create_raw_statement("SHAPE", &["2024-06-30", "2023-06-30"]);
    let display: StatementTable = analysis::transform(&raw, CleanupPolicy::Coerce, 0.5).unwrap();

    let periods: Vec<&str> = display.periods.iter().map(|p| p.as_str()).collect();
    assert_eq!(periods, vec!["2023", "2024"]);
    assert_eq!(display.rows.len(), LineItem::ALL.len() + Kpi::ALL.len());
    assert_eq!(display.value("Eigenkapital", "2024"), Some(150.0));
    // Ratios are unit free, so conversion leaves them unchanged
    assert_eq!(display.value("1. Liquiditätsquote", "2024"), Some(2.0));
    assert_eq!(display.value("Netto-Umlaufvermögen", "2024"), Some(100.0));
}
