use thiserror::Error;

/// Failures of a single ticker's pipeline run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// Provider has no balance sheet for the symbol (invalid, delisted or unreachable)
    #[error("no balance sheet data available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("no exchange rate available for {pair}: {reason}")]
    RateUnavailable { pair: String, reason: String },

    /// Provider schema drift: required line items are absent from the raw table
    #[error("balance sheet for {ticker} is missing line items: {}", .items.join(", "))]
    MissingLineItems { ticker: String, items: Vec<String> },

    #[error("invalid exchange rate {0}: must be finite and positive")]
    InvalidRate(f64),

    #[error("no ticker symbols supplied")]
    EmptyInput,
}

impl PipelineError {
    pub fn data_unavailable(ticker: &str, reason: impl ToString) -> Self {
        PipelineError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn rate_unavailable(pair: &str, reason: impl ToString) -> Self {
        PipelineError::RateUnavailable {
            pair: pair.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
