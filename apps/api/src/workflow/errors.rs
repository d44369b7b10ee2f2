use thiserror::Error;

use crate::domain::repositories::StoreError;

/// Errors raised by the workflow engine
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Invalid workflow snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid workflow state: {0}")]
    InvalidState(String),

    #[error("Step {step_id} aborted: {reason}")]
    StepAborted { step_id: String, reason: String },
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => WorkflowError::NotFound(what),
            StoreError::Serialization(e) => WorkflowError::InvalidSnapshot(e.to_string()),
            other => WorkflowError::Persistence(other.to_string()),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
