use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::errors::{AgentError, AgentResult};
use crate::config::PipelineConfig;
use crate::domain::repositories::artifact_store::normalize_deliverable_id;
use crate::domain::repositories::{ArtifactStore, FeedbackRepository, ProjectRepository};

/// Confirmation returned once feedback is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackReceipt {
    pub feedback_id: i64,
    pub feedback_path: String,
    pub step_id: String,
}

/// Feedback Intake
///
/// Stores revision feedback and files a `pending` record for the owning
/// worker. Submission never re-runs the step; the prompt composer picks the
/// feedback up the next time that step is executed.
pub struct FeedbackIntake {
    projects: Arc<dyn ProjectRepository>,
    feedback: Arc<dyn FeedbackRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    pipeline: Arc<PipelineConfig>,
}

impl FeedbackIntake {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        feedback: Arc<dyn FeedbackRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        pipeline: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            projects,
            feedback,
            artifacts,
            pipeline,
        }
    }

    /// Persist feedback on `deliverable_id` and record it as pending
    pub async fn submit(
        &self,
        project: &str,
        deliverable_id: &str,
        text: &str,
        agent: &str,
    ) -> AgentResult<FeedbackReceipt> {
        if text.trim().is_empty() {
            return Err(AgentError::InvalidInput("feedback text is empty".to_string()));
        }

        let step_id = normalize_deliverable_id(deliverable_id);

        let record = self
            .projects
            .find_by_name(project)
            .await?
            .ok_or_else(|| AgentError::NotFound(format!("project {}", project)))?;

        match self.pipeline.agent_for_step(step_id) {
            Some(owner) if owner != agent => {
                warn!(step_id = %step_id, owner = %owner, agent = %agent, "Feedback routed to a worker that does not own the step");
            }
            None => warn!(step_id = %step_id, "Feedback on a deliverable outside the pipeline"),
            _ => {}
        }

        let feedback_path = self.artifacts.save_feedback(project, step_id, text).await?;
        let feedback_id = self
            .feedback
            .create(record.id, step_id, agent, text)
            .await?;

        info!(project = %project, step_id = %step_id, feedback_id, "Feedback recorded");

        Ok(FeedbackReceipt {
            feedback_id,
            feedback_path,
            step_id: step_id.to_string(),
        })
    }
}
