//! Pure transformation stages of the balance-sheet pipeline

pub mod currency;
pub mod kpi_engine;
pub mod normalizer;
pub mod translator;

pub use currency::convert;
pub use kpi_engine::derive_kpis;
pub use normalizer::{normalize, CleanupPolicy};
pub use translator::{display_name, translate};

use crate::error::PipelineResult;
use crate::models::{DisplayStatement, RawStatement};

/// Run every pure stage on a fetched statement: normalize, convert, derive KPIs, translate
pub fn transform(raw: &RawStatement, policy: CleanupPolicy, rate: f64) -> PipelineResult<DisplayStatement> {
    let normalized = normalize(raw, policy)?;
    let converted = convert(&normalized, rate)?;
    let annotated = derive_kpis(&converted);
    Ok(translate(&annotated))
}
