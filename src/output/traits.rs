//! Output sink trait and errors

use crate::pipeline::Identifier;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of a run's identifiers
///
/// `write` is called exactly once per run, after resolution has finished,
/// whatever the number of failed links.
pub trait OutputSink {
    fn write(&self, identifiers: &[Identifier]) -> OutputResult<()>;
}
