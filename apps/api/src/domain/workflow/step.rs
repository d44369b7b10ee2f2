use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::StepStatus;

/// One entry of the ordered pipeline; loaded once from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStepDefinition {
    pub id: String,
    pub agent: String,
    pub title: String,
    pub description: String,
}

/// Result of executing one step, as returned by the step processor
///
/// Stored verbatim in the step's `result` field of the workflow snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub success: bool,
    pub step_id: String,
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(step_id: &str, agent: &str, deliverable_path: impl Into<String>) -> Self {
        Self {
            success: true,
            step_id: step_id.to_string(),
            agent: agent.to_string(),
            deliverable_path: Some(deliverable_path.into()),
            message: None,
        }
    }

    pub fn failed(step_id: &str, agent: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            step_id: step_id.to_string(),
            agent: agent.to_string(),
            deliverable_path: None,
            message: Some(message.into()),
        }
    }
}

/// Mutable per-project state of one step
///
/// Serialized with its definition fields inlined, so a snapshot is readable
/// on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    #[serde(flatten)]
    pub definition: WorkflowStepDefinition,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<StepOutcome>,
}

impl StepState {
    pub fn new(definition: WorkflowStepDefinition) -> Self {
        Self {
            definition,
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            result: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn agent(&self) -> &str {
        &self.definition.agent
    }

    /// Marks the step as running
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<(), String> {
        if !self.status.can_transition_to(StepStatus::Processing) {
            return Err(format!(
                "Cannot start step {} in {} status",
                self.definition.id, self.status
            ));
        }

        self.status = StepStatus::Processing;
        self.started_at = Some(now);
        self.completed_at = None;
        self.result = None;
        Ok(())
    }

    /// Records the processor outcome; Completed or Failed depending on `success`
    pub fn finish(&mut self, outcome: StepOutcome, now: DateTime<Utc>) -> Result<(), String> {
        let next = if outcome.success {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        };

        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Cannot finish step {} in {} status",
                self.definition.id, self.status
            ));
        }

        self.status = next;
        self.completed_at = Some(now);
        self.result = Some(outcome);
        Ok(())
    }

    /// Puts an interrupted step back in the queue
    pub fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.started_at = None;
        self.completed_at = None;
        self.result = None;
    }
}
