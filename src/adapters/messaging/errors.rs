use thiserror::Error;

use crate::domain::errors::DomainError;

/// Failures raised while handling one inbound delivery.
///
/// Only [`IntakeError::RequeueRequested`] asks the broker for a redelivery;
/// every other kind is terminal for the message.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Cannot deserialize payload: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Invalid submission: {0}")]
    Validation(String),

    #[error("Requeue requested: {0}")]
    RequeueRequested(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error(transparent)]
    Domain(DomainError),
}

impl IntakeError {
    pub fn is_requeue(&self) -> bool {
        matches!(self, Self::RequeueRequested(_))
    }
}

impl From<DomainError> for IntakeError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EngineBusy => Self::RequeueRequested(err.to_string()),
            DomainError::ValidationFailed(message) => Self::Validation(message),
            DomainError::EngineUnavailable(message) => Self::EngineUnavailable(message),
            other => Self::Domain(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskId;

    #[test]
    fn test_engine_busy_requests_requeue() {
        let err = IntakeError::from(DomainError::EngineBusy);
        assert!(err.is_requeue());
    }

    #[test]
    fn test_other_domain_errors_are_terminal() {
        assert!(!IntakeError::from(DomainError::DuplicateTask(TaskId::new("t"))).is_requeue());
        assert!(!IntakeError::from(DomainError::EngineFailed("crash".into())).is_requeue());
        assert!(matches!(
            IntakeError::from(DomainError::ValidationFailed("x".into())),
            IntakeError::Validation(_)
        ));
        assert!(matches!(
            IntakeError::from(DomainError::EngineUnavailable("stockfish".into())),
            IntakeError::EngineUnavailable(_)
        ));
    }
}
