use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::errors::AgentResult;
use super::gateway::WorkerGateway;
use super::prompts::{PromptComposer, StepContext};
use crate::config::GenerationParams;
use crate::domain::repositories::{
    ArtifactStore, InteractionRepository, InteractionStatus, ProjectRepository,
};
use crate::domain::workflow::StepOutcome;

/// Executes one pipeline step; the seam between the workflow engine and the agents
///
/// Implementations never fail: every error is folded into a `StepOutcome`
/// with `success == false` so that one step cannot abort the engine loop.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, project: &str, step_id: &str, agent: &str) -> StepOutcome;
}

/// Step Processor: compose prompt, invoke worker, persist artifact, record outcome
pub struct StepProcessor {
    projects: Arc<dyn ProjectRepository>,
    interactions: Arc<dyn InteractionRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    composer: PromptComposer,
    gateway: Arc<WorkerGateway>,
    params: GenerationParams,
}

impl StepProcessor {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        interactions: Arc<dyn InteractionRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        composer: PromptComposer,
        gateway: Arc<WorkerGateway>,
        params: GenerationParams,
    ) -> Self {
        Self {
            projects,
            interactions,
            artifacts,
            composer,
            gateway,
            params,
        }
    }

    /// Run `step_id` of `project` with `agent`, optionally with extra context
    ///
    /// Creates exactly one interaction row and applies exactly one terminal
    /// update to it. If the project does not exist no row is created.
    pub async fn process(
        &self,
        project: &str,
        step_id: &str,
        agent: &str,
        context: Option<&StepContext>,
    ) -> StepOutcome {
        let project_id = match self.projects.find_by_name(project).await {
            Ok(Some(record)) => record.id,
            Ok(None) => {
                error!(project = %project, "Project not found");
                return StepOutcome::failed(step_id, agent, format!("Project {} not found", project));
            }
            Err(e) => {
                error!(project = %project, error = %e, "Project lookup failed");
                return StepOutcome::failed(step_id, agent, format!("Error: {}", e));
            }
        };

        let interaction_id = match self.interactions.create(project_id, agent, step_id).await {
            Ok(id) => id,
            Err(e) => {
                error!(project = %project, step_id = %step_id, error = %e, "Failed to open interaction");
                return StepOutcome::failed(step_id, agent, format!("Error: {}", e));
            }
        };

        match self.run(project, project_id, step_id, agent, context).await {
            Ok((path, content)) => {
                if let Err(e) = self
                    .interactions
                    .complete(interaction_id, InteractionStatus::Completed, &content)
                    .await
                {
                    error!(interaction_id, error = %e, "Failed to close interaction");
                    return StepOutcome::failed(step_id, agent, format!("Error: {}", e));
                }

                info!(project = %project, step_id = %step_id, agent = %agent, "Step completed");
                StepOutcome::succeeded(step_id, agent, path)
            }
            Err(e) => {
                let message = e.in_band_text();
                if let Err(update_err) = self
                    .interactions
                    .complete(interaction_id, InteractionStatus::Failed, &message)
                    .await
                {
                    error!(interaction_id, error = %update_err, "Failed to close interaction");
                }

                error!(project = %project, step_id = %step_id, error = %e, "Step failed");
                StepOutcome::failed(step_id, agent, message)
            }
        }
    }

    async fn run(
        &self,
        project: &str,
        project_id: i64,
        step_id: &str,
        agent: &str,
        context: Option<&StepContext>,
    ) -> AgentResult<(String, String)> {
        let prompt = self.composer.compose(project, step_id, agent, context).await?;

        match self
            .gateway
            .invoke(agent, &prompt, self.params, Some(project_id))
            .await
        {
            Ok(text) => {
                let path = self
                    .artifacts
                    .save_deliverable(project, step_id, &text, agent)
                    .await?;
                Ok((path, text))
            }
            Err(e) if e.is_worker_failure() => {
                // error text only stands in for a deliverable that was never produced
                match self.artifacts.get_deliverable(project, step_id).await {
                    Ok(Some(_)) => {
                        warn!(step_id = %step_id, "Keeping previous deliverable after failed re-run");
                    }
                    _ => {
                        if let Err(save_err) = self
                            .artifacts
                            .save_deliverable(project, step_id, &e.in_band_text(), agent)
                            .await
                        {
                            warn!(step_id = %step_id, error = %save_err, "Failed to persist error text");
                        }
                    }
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl StepExecutor for StepProcessor {
    async fn execute(&self, project: &str, step_id: &str, agent: &str) -> StepOutcome {
        self.process(project, step_id, agent, None).await
    }
}

