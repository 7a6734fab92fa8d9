//! Statement normalization
//!
//! Projects a raw provider balance sheet onto the canonical line items,
//! collapses period labels to fiscal years and repairs missing values
//! according to a [`CleanupPolicy`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{FiscalPeriod, LineItem, NormalizedStatement, RawStatement, RawValue, StatementTable};

/// How missing or non-numeric cells are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Non-numeric cells become explicit gaps
    #[default]
    Coerce,
    /// Zero-fill the first and last period, then interpolate linearly in between
    Interpolate,
}

impl FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coerce" => Ok(CleanupPolicy::Coerce),
            "interpolate" => Ok(CleanupPolicy::Interpolate),
            other => Err(format!("unknown cleanup policy '{}', expected 'coerce' or 'interpolate'", other)),
        }
    }
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupPolicy::Coerce => f.write_str("coerce"),
            CleanupPolicy::Interpolate => f.write_str("interpolate"),
        }
    }
}

/// Normalize a raw statement into the canonical nine-row table
pub fn normalize(raw: &RawStatement, policy: CleanupPolicy) -> PipelineResult<NormalizedStatement> {
    let missing: Vec<String> = LineItem::ALL
        .iter()
        .filter(|item| !raw.rows.contains_key(item.name()))
        .map(|item| item.name().to_string())
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::MissingLineItems {
            ticker: raw.ticker.clone(),
            items: missing,
        });
    }

    let columns = fiscal_columns(raw);
    let periods: Vec<FiscalPeriod> = columns.keys().cloned().collect();
    let mut table = StatementTable::new(&raw.ticker, periods);

    for item in LineItem::ALL {
        let cells = &raw.rows[item.name()];
        let values: Vec<Option<f64>> = columns
            .values()
            .map(|label| cells.get(label).and_then(coerce))
            .collect();

        let values = match policy {
            CleanupPolicy::Coerce => values,
            CleanupPolicy::Interpolate => interpolate(values),
        };
        table.push_row(item.name(), values);
    }

    debug!(
        "Normalized {} with {} periods using {} policy",
        raw.ticker,
        table.periods.len(),
        policy
    );
    Ok(table)
}

/// Map each fiscal year to the raw label backing it, ascending by year.
///
/// When two labels truncate to the same year the one sorting last wins.
fn fiscal_columns(raw: &RawStatement) -> BTreeMap<FiscalPeriod, String> {
    let mut columns: BTreeMap<FiscalPeriod, String> = BTreeMap::new();

    for label in raw.period_labels() {
        let period = FiscalPeriod::from_label(&label);
        match columns.get(&period).cloned() {
            Some(existing) if existing.as_str() >= label.as_str() => {
                warn!(
                    "⚠️ {}: dropping period {} and its values in favour of {} (same fiscal year {})",
                    raw.ticker, label, existing, period
                );
            }
            Some(existing) => {
                warn!(
                    "⚠️ {}: dropping period {} and its values in favour of {} (same fiscal year {})",
                    raw.ticker, existing, label, period
                );
                columns.insert(period, label);
            }
            None => {
                columns.insert(period, label);
            }
        }
    }

    columns
}

/// Numeric value of a raw cell, or `None` when it is not a finite number
fn coerce(value: &RawValue) -> Option<f64> {
    let number = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
        RawValue::Missing => return None,
    };
    number.is_finite().then_some(number)
}

/// Zero-fill both ends, then fill interior gaps linearly between known neighbours
fn interpolate(mut values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let len = values.len();
    if len == 0 {
        return values;
    }

    if values[0].is_none() {
        values[0] = Some(0.0);
    }
    if values[len - 1].is_none() {
        values[len - 1] = Some(0.0);
    }

    let mut last_known = 0;
    for idx in 1..len {
        if let Some(end) = values[idx] {
            if idx - last_known > 1 {
                // Both endpoints are set above, so a left anchor always exists
                let start = values[last_known].unwrap_or(0.0);
                let span = (idx - last_known) as f64;
                for gap in (last_known + 1)..idx {
                    let t = (gap - last_known) as f64 / span;
                    values[gap] = Some(start + (end - start) * t);
                }
            }
            last_known = idx;
        }
    }

    values
}
