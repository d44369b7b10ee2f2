use thiserror::Error;

use crate::domain::repositories::StoreError;

/// Errors that can occur in the agent system
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Worker backend unreachable: {0}")]
    TransportError(String),

    #[error("Persistence failed: {0}")]
    PersistenceError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AgentError {
    /// Explanatory text recorded in place of a worker response
    pub fn in_band_text(&self) -> String {
        match self {
            AgentError::UnknownWorker(name) => format!("Agent {} is not recognised", name),
            AgentError::TransportError(reason) => {
                format!("Error communicating with the agent: {}", reason)
            }
            other => format!("Error: {}", other),
        }
    }

    /// Errors that the step processor turns into a Failed step
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, AgentError::UnknownWorker(_) | AgentError::TransportError(_))
    }
}

impl From<StoreError> for AgentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AgentError::NotFound(what),
            other => AgentError::PersistenceError(other.to_string()),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_band_text_names_the_worker() {
        let text = AgentError::UnknownWorker("ghost".to_string()).in_band_text();
        assert_eq!(text, "Agent ghost is not recognised");
    }

    #[test]
    fn transport_errors_are_worker_failures() {
        assert!(AgentError::TransportError("refused".to_string()).is_worker_failure());
        assert!(!AgentError::PersistenceError("disk".to_string()).is_worker_failure());
    }

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err: AgentError = StoreError::NotFound("project Acme".to_string()).into();
        assert!(matches!(err, AgentError::NotFound(_)));

        let err: AgentError = StoreError::Io(std::io::Error::other("disk full")).into();
        assert!(matches!(err, AgentError::PersistenceError(_)));
    }
}
