//! Errors surfaced by the headless runner.

use thiserror::Error;

use skirmish_core::error::SimError;

/// Result alias for runner operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Anything that can stop a headless run.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Session construction, config or replay failure.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Writing the event stream or a results file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an event or summary failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
