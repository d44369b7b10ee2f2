use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::errors::{WorkflowError, WorkflowResult};
use crate::agents::StepExecutor;
use crate::config::PipelineConfig;
use crate::domain::project::ProjectStatus;
use crate::domain::repositories::{ProjectRepository, SnapshotStore};
use crate::domain::workflow::{
    StepOutcome, StepState, StepStatus, WorkflowState, WorkflowStatus, WorkflowStepDefinition,
};

/// Collaborators shared by every workflow engine
#[derive(Clone)]
pub struct WorkflowDeps {
    pub executor: Arc<dyn StepExecutor>,
    pub projects: Arc<dyn ProjectRepository>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub pipeline: Arc<PipelineConfig>,
    /// Pause between two steps, to avoid saturating the worker backend
    pub step_delay: Duration,
}

/// Read-consistent view of a workflow, as served by `status()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub project_name: String,
    pub status: WorkflowStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub steps: Vec<StepState>,
}

struct Runtime {
    state: WorkflowState,
    /// True while a background loop owns the pipeline
    loop_active: bool,
}

struct Shared {
    project_name: String,
    deps: WorkflowDeps,
    runtime: Mutex<Runtime>,
    token: CancellationToken,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

/// Workflow Engine for one project
///
/// Cheap to clone; clones share the same state, lock and background task.
///
/// The runtime lock guards the in-memory state and snapshot writes. It is
/// never held while a step executes.
#[derive(Clone)]
pub struct ProjectWorkflow {
    shared: Arc<Shared>,
}

impl ProjectWorkflow {
    fn from_state(state: WorkflowState, deps: WorkflowDeps) -> Self {
        Self {
            shared: Arc::new(Shared {
                project_name: state.project_name.clone(),
                deps,
                runtime: Mutex::new(Runtime {
                    state,
                    loop_active: false,
                }),
                token: CancellationToken::new(),
                task: std::sync::Mutex::new(None),
            }),
        }
    }

    /// New Pending workflow; its initial snapshot is persisted immediately
    pub async fn create(project_name: &str, deps: WorkflowDeps) -> Self {
        let state = WorkflowState::new(project_name, &deps.pipeline.steps);
        let workflow = Self::from_state(state, deps);

        let runtime = workflow.shared.runtime.lock().await;
        workflow.persist(&runtime.state).await;
        drop(runtime);

        workflow
    }

    /// Rebuild a workflow from its persisted snapshot
    ///
    /// Returns `Ok(None)` when the project has no saved state.
    pub async fn load(project_name: &str, deps: WorkflowDeps) -> WorkflowResult<Option<Self>> {
        let Some(snapshot) = deps.snapshots.load(project_name).await? else {
            warn!(project = %project_name, "No saved workflow state");
            return Ok(None);
        };

        let state = WorkflowState::restore(snapshot, &deps.pipeline.steps);
        info!(
            project = %project_name,
            status = %state.status,
            current_step = state.current_step_index,
            "Workflow loaded"
        );

        Ok(Some(Self::from_state(state, deps)))
    }

    /// Load the saved workflow, or create a fresh one
    pub async fn open(project_name: &str, deps: WorkflowDeps) -> WorkflowResult<Self> {
        match Self::load(project_name, deps.clone()).await? {
            Some(workflow) => Ok(workflow),
            None => Ok(Self::create(project_name, deps).await),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.shared.project_name
    }

    /// Start, or restart after a pause, the execution loop
    ///
    /// Returns `Ok(false)` when the workflow is Processing, Completed or
    /// Failed. Fails with `NotFound` if the project no longer exists.
    pub async fn start(&self) -> WorkflowResult<bool> {
        let mut runtime = self.shared.runtime.lock().await;

        if !runtime.state.status.can_start() {
            warn!(
                project = %self.project_name(),
                status = %runtime.state.status,
                "Workflow already started or finished"
            );
            return Ok(false);
        }

        if self.shared.token.is_cancelled() {
            warn!(project = %self.project_name(), "Workflow is shut down");
            return Ok(false);
        }

        self.shared
            .deps
            .projects
            .update_status(self.project_name(), ProjectStatus::InProgress)
            .await?;

        runtime
            .state
            .transition(WorkflowStatus::Processing)
            .map_err(WorkflowError::InvalidState)?;
        self.persist(&runtime.state).await;

        if runtime.loop_active {
            // the paused loop is still finishing its in-flight step and will carry on
            info!(project = %self.project_name(), "Workflow resumed before loop exited");
            return Ok(true);
        }

        runtime.loop_active = true;
        let workflow = self.clone();
        let handle = tokio::spawn(async move { workflow.run().await });
        if let Ok(mut task) = self.shared.task.lock() {
            *task = Some(handle);
        }

        info!(
            project = %self.project_name(),
            from_step = runtime.state.current_step_index,
            "Workflow started"
        );
        Ok(true)
    }

    /// Request a pause; takes effect once the in-flight step is recorded
    ///
    /// Returns `Ok(false)` unless the workflow is Processing.
    pub async fn pause(&self) -> WorkflowResult<bool> {
        let mut runtime = self.shared.runtime.lock().await;

        if runtime.state.status != WorkflowStatus::Processing {
            warn!(
                project = %self.project_name(),
                status = %runtime.state.status,
                "Cannot pause workflow"
            );
            return Ok(false);
        }

        runtime
            .state
            .transition(WorkflowStatus::Paused)
            .map_err(WorkflowError::InvalidState)?;
        self.mirror_project_status(ProjectStatus::Paused).await;
        self.persist(&runtime.state).await;

        info!(project = %self.project_name(), "Workflow paused");
        Ok(true)
    }

    /// Same as `start()`; continues from the persisted step index
    pub async fn resume(&self) -> WorkflowResult<bool> {
        self.start().await
    }

    /// Snapshot of status, index and every step, taken under the lock
    pub async fn status(&self) -> WorkflowReport {
        let runtime = self.shared.runtime.lock().await;
        WorkflowReport {
            project_name: runtime.state.project_name.clone(),
            status: runtime.state.status,
            current_step: runtime.state.current_step_index,
            total_steps: runtime.state.total_steps(),
            steps: runtime.state.steps.clone(),
        }
    }

    /// Full state copy
    pub async fn state(&self) -> WorkflowState {
        self.shared.runtime.lock().await.state.clone()
    }

    /// Wait for the current background loop, if any, to exit
    pub async fn wait(&self) {
        let handle = match self.shared.task.lock() {
            Ok(mut task) => task.take(),
            Err(_) => None,
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(project = %self.project_name(), error = %e, "Workflow task ended abnormally");
            }
        }
    }

    /// Stop at the next step boundary and join the loop
    ///
    /// The status is left as-is, so the persisted snapshot still shows the
    /// run as Processing and `load()` restores it as Paused.
    pub async fn shutdown(&self) {
        self.shared.token.cancel();
        self.wait().await;
    }

    async fn run(self) {
        if let Err(e) = self.run_steps().await {
            error!(project = %self.project_name(), error = %e, "Workflow aborted");

            let mut runtime = self.shared.runtime.lock().await;
            let index = runtime.state.current_step_index;
            if runtime.state.steps.get(index).map(|s| s.status) == Some(StepStatus::Processing) {
                let step = &runtime.state.steps[index].definition;
                let outcome = StepOutcome::failed(&step.id, &step.agent, e.to_string());
                if let Err(reason) = runtime.state.finish_current_step(outcome, Utc::now()) {
                    error!(project = %self.project_name(), %reason, "Could not record aborted step");
                }
            }

            // Failed may be entered from Paused here, outside the normal transition table
            runtime.state.status = WorkflowStatus::Failed;
            runtime.loop_active = false;
            self.mirror_project_status(ProjectStatus::Failed).await;
            self.persist(&runtime.state).await;
        }
    }

    async fn run_steps(&self) -> WorkflowResult<()> {
        let project = self.project_name().to_string();

        let index = self.shared.runtime.lock().await.state.current_step_index;
        if index > 0 {
            info!(project = %project, step = index, "Resuming workflow");
        }

        loop {
            let step = {
                let mut runtime = self.shared.runtime.lock().await;

                if self.shared.token.is_cancelled() {
                    runtime.loop_active = false;
                    self.persist(&runtime.state).await;
                    info!(project = %project, "Workflow loop cancelled");
                    return Ok(());
                }

                if runtime.state.status == WorkflowStatus::Paused {
                    runtime.loop_active = false;
                    self.persist(&runtime.state).await;
                    info!(project = %project, step = runtime.state.current_step_index, "Workflow loop stopped on pause");
                    return Ok(());
                }

                if runtime.state.all_steps_attempted() {
                    runtime
                        .state
                        .transition(WorkflowStatus::Completed)
                        .map_err(WorkflowError::InvalidState)?;
                    runtime.loop_active = false;
                    self.mirror_project_status(ProjectStatus::Completed).await;
                    self.persist(&runtime.state).await;
                    info!(project = %project, "Workflow completed");
                    return Ok(());
                }

                let step = runtime
                    .state
                    .begin_current_step(Utc::now())
                    .map_err(WorkflowError::InvalidState)?;
                self.persist(&runtime.state).await;
                step
            };

            info!(project = %project, step_id = %step.id, agent = %step.agent, "Executing step");
            let outcome = self.execute_step(&step).await?;

            {
                let mut runtime = self.shared.runtime.lock().await;
                let message = outcome.message.clone();
                let status = runtime
                    .state
                    .finish_current_step(outcome, Utc::now())
                    .map_err(WorkflowError::InvalidState)?;

                match status {
                    StepStatus::Completed => {
                        info!(project = %project, step_id = %step.id, "Step completed")
                    }
                    _ => error!(
                        project = %project,
                        step_id = %step.id,
                        message = message.as_deref().unwrap_or(""),
                        "Step failed, continuing with next step"
                    ),
                }

                self.persist(&runtime.state).await;
            }

            tokio::select! {
                _ = self.shared.token.cancelled() => {}
                _ = tokio::time::sleep(self.shared.deps.step_delay) => {}
            }
        }
    }

    /// Runs the executor on its own task so a panic surfaces as an error
    async fn execute_step(&self, step: &WorkflowStepDefinition) -> WorkflowResult<StepOutcome> {
        let executor = self.shared.deps.executor.clone();
        let project = self.project_name().to_string();
        let step_id = step.id.clone();
        let agent = step.agent.clone();

        tokio::spawn(async move { executor.execute(&project, &step_id, &agent).await })
            .await
            .map_err(|e| WorkflowError::StepAborted {
                step_id: step.id.clone(),
                reason: e.to_string(),
            })
    }

    async fn mirror_project_status(&self, status: ProjectStatus) {
        if let Err(e) = self
            .shared
            .deps
            .projects
            .update_status(self.project_name(), status)
            .await
        {
            warn!(project = %self.project_name(), %status, error = %e, "Failed to update project status");
        }
    }

    async fn persist(&self, state: &WorkflowState) {
        if let Err(e) = self.shared.deps.snapshots.save(&state.snapshot(Utc::now())).await {
            error!(project = %self.project_name(), error = %e, "Failed to save workflow state");
        }
    }
}
