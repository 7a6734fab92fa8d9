use crate::error::{PipelineError, PipelineResult};
use crate::models::{ConvertedStatement, StatementTable};

/// Rescale every monetary cell by a single exchange rate.
///
/// Missing cells stay missing. The rate has to be finite and positive.
pub fn convert(statement: &StatementTable, rate: f64) -> PipelineResult<ConvertedStatement> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(PipelineError::InvalidRate(rate));
    }
    Ok(statement.map_values(|value| value * rate))
}
