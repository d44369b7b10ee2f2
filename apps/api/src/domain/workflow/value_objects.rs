use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectStatus;

/// Represents the lifecycle status of a project workflow
///
/// # Status Transitions
/// ```text
/// Pending -> Processing -> Completed
///               |  ^   \-> Failed
///               v  |
///              Paused
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    /// Workflow created, never started
    Pending,
    /// Execution loop is running
    Processing,
    /// Every step reached a terminal status
    Completed,
    /// The execution loop aborted
    Failed,
    /// Loop stops at the next step boundary
    Paused,
}

impl WorkflowStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use webagency_api::domain::workflow::WorkflowStatus;
    ///
    /// assert!(WorkflowStatus::Pending.can_transition_to(WorkflowStatus::Processing));
    /// assert!(!WorkflowStatus::Pending.can_transition_to(WorkflowStatus::Paused));
    /// ```
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Paused)
                | (Paused, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    /// `start()` is only accepted from these states
    pub fn can_start(&self) -> bool {
        self.can_transition_to(WorkflowStatus::Processing)
    }

    /// Completed and Failed end the workflow as a whole
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    /// Project status mirrored into the relational store
    pub fn project_status(&self) -> ProjectStatus {
        match self {
            WorkflowStatus::Pending => ProjectStatus::Created,
            WorkflowStatus::Processing => ProjectStatus::InProgress,
            WorkflowStatus::Paused => ProjectStatus::Paused,
            WorkflowStatus::Completed => ProjectStatus::Completed,
            WorkflowStatus::Failed => ProjectStatus::Failed,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Pending => write!(f, "pending"),
            WorkflowStatus::Processing => write!(f, "processing"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Failed => write!(f, "failed"),
            WorkflowStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Status of a single pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StepStatus {
    /// Checks if a step may move from current status to next status
    ///
    /// `Processing -> Pending` only happens when an interrupted run is restored.
    pub fn can_transition_to(&self, next: StepStatus) -> bool {
        use StepStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Completed) | (Processing, Failed) | (Processing, Pending)
        )
    }

    /// Completed or Failed: the step ran and its outcome is recorded
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Processing => write!(f, "processing"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}
