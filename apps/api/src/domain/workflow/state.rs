use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::{StepOutcome, StepState, WorkflowStepDefinition};
use super::value_objects::{StepStatus, WorkflowStatus};

/// Workflow aggregate root, one per project
///
/// This is also the snapshot document written after every transition.
///
/// # Invariants
/// - `current_step_index` equals the number of terminal steps
/// - steps before the index are Completed or Failed
/// - steps from the index onward are Pending, except the step at the index
///   which may be Processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub project_name: String,
    pub status: WorkflowStatus,
    pub current_step_index: usize,
    pub steps: Vec<StepState>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    /// Fresh Pending workflow with one Pending step per definition
    pub fn new(project_name: impl Into<String>, definitions: &[WorkflowStepDefinition]) -> Self {
        Self {
            project_name: project_name.into(),
            status: WorkflowStatus::Pending,
            current_step_index: 0,
            steps: definitions.iter().cloned().map(StepState::new).collect(),
            updated_at: None,
        }
    }

    /// Rebuilds live state from a persisted snapshot
    ///
    /// Only snapshot steps matching the configured pipeline are kept. A run
    /// that was interrupted while Processing comes back Paused, with its
    /// in-flight step reset to Pending, since no task is executing it anymore.
    pub fn restore(
        snapshot: WorkflowState,
        definitions: &[WorkflowStepDefinition],
    ) -> Self {
        let mut state = Self::new(snapshot.project_name, definitions);
        state.status = snapshot.status;
        state.updated_at = snapshot.updated_at;

        for (step, saved) in state.steps.iter_mut().zip(snapshot.steps) {
            if saved.definition.id != step.definition.id {
                tracing::warn!(
                    expected = %step.definition.id,
                    found = %saved.definition.id,
                    "Snapshot step does not match pipeline definition"
                );
            }
            step.status = saved.status;
            step.started_at = saved.started_at;
            step.completed_at = saved.completed_at;
            step.result = saved.result;
        }

        state.current_step_index = snapshot.current_step_index.min(state.steps.len());

        for step in state.steps.iter_mut() {
            if step.status == StepStatus::Processing {
                step.reset();
            }
        }

        if state.status == WorkflowStatus::Processing {
            state.status = WorkflowStatus::Paused;
        }

        state
    }

    /// Number of steps in the pipeline
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// True once every step has been attempted
    pub fn all_steps_attempted(&self) -> bool {
        self.current_step_index >= self.steps.len()
    }

    /// Applies a workflow-level status transition
    pub fn transition(&mut self, next: WorkflowStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Invalid workflow transition from {} to {}",
                self.status, next
            ));
        }

        self.status = next;
        Ok(())
    }

    /// Marks the step at `current_step_index` as Processing and returns its definition
    pub fn begin_current_step(&mut self, now: DateTime<Utc>) -> Result<WorkflowStepDefinition, String> {
        let index = self.current_step_index;
        let step = self
            .steps
            .get_mut(index)
            .ok_or_else(|| format!("No step at index {}", index))?;

        step.begin(now)?;
        Ok(step.definition.clone())
    }

    /// Records the outcome of the current step and advances the index
    pub fn finish_current_step(&mut self, outcome: StepOutcome, now: DateTime<Utc>) -> Result<StepStatus, String> {
        let index = self.current_step_index;
        let step = self
            .steps
            .get_mut(index)
            .ok_or_else(|| format!("No step at index {}", index))?;

        step.finish(outcome, now)?;
        let status = step.status;
        self.current_step_index += 1;
        Ok(status)
    }

    /// Snapshot copy stamped with the write time
    pub fn snapshot(&self, now: DateTime<Utc>) -> WorkflowState {
        let mut snapshot = self.clone();
        snapshot.updated_at = Some(now);
        snapshot
    }

    /// Checks the index/step-status invariant
    pub fn is_consistent(&self) -> bool {
        let terminal = self.steps.iter().filter(|s| s.status.is_terminal()).count();
        if terminal != self.current_step_index {
            return false;
        }

        self.steps.iter().enumerate().all(|(i, step)| {
            if i < self.current_step_index {
                step.status.is_terminal()
            } else if i == self.current_step_index {
                matches!(step.status, StepStatus::Pending | StepStatus::Processing)
            } else {
                step.status == StepStatus::Pending
            }
        })
    }
}
