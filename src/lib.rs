pub mod analysis;
pub mod api;
pub mod commands;
pub mod concurrent_fetcher;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod statement_cache;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::StatementPipeline;
