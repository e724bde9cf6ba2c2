//! Domain errors for the kibitzer analysis pipeline.

use thiserror::Error;

use super::models::TaskId;

/// Domain-level errors that can occur while orchestrating an analysis.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Duplicate task {0}: an identical analysis is already cached")]
    DuplicateTask(TaskId),

    #[error("Engine is busy with another analysis")]
    EngineBusy,

    #[error("Engine is not available: {0}")]
    EngineUnavailable(String),

    #[error("Engine run failed: {0}")]
    EngineFailed(String),

    #[error("Notation error: {0}")]
    Notation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Broker error: {0}")]
    Broker(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
