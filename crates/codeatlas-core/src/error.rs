//! Run-level errors

use thiserror::Error;

/// Conditions that make a whole analysis run meaningless.
///
/// Per-file problems never surface here; they degrade the affected node instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file tree is empty or contains no files")]
    EmptyTree,

    #[error("invalid repository locator: {0}")]
    InvalidLocator(String),

    #[error("analysis timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
