// Prompt composition for pipeline steps
//
// The composer reads the brief, earlier deliverables and pending feedback
// through the artifact store and renders them into the instruction text for
// one worker. The step order it walks comes from the pipeline config.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::AgentResult;
use crate::config::PipelineConfig;
use crate::domain::repositories::ArtifactStore;

/// Maximum characters of each earlier deliverable quoted in a prompt
pub const PREVIEW_CHARS: usize = 500;

/// Extra free-text guidance supplied when a step is run manually
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepContext {
    pub instructions: Option<String>,
}

/// Output of an earlier step, as quoted in the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorDeliverable {
    pub step_id: String,
    pub agent: String,
    pub content: String,
}

/// Builds worker prompts
pub struct PromptComposer {
    pipeline: Arc<PipelineConfig>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl PromptComposer {
    pub fn new(pipeline: Arc<PipelineConfig>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self { pipeline, artifacts }
    }

    /// Compose the prompt for `step_id` of `project`
    pub async fn compose(
        &self,
        project: &str,
        step_id: &str,
        agent: &str,
        context: Option<&StepContext>,
    ) -> AgentResult<String> {
        let brief = match self.artifacts.get_brief(project).await? {
            Some(brief) => brief,
            None => {
                warn!(project = %project, "Project brief not found, using placeholder");
                format!("Project: {}", project)
            }
        };

        let prior = self.prior_deliverables(project, step_id).await?;
        let feedback = self.artifacts.get_feedback(project, step_id).await?;

        Ok(self.render(project, step_id, agent, &brief, &prior, feedback.as_deref(), context))
    }

    /// Deliverables of every step that precedes `step_id` and has output
    pub async fn prior_deliverables(
        &self,
        project: &str,
        step_id: &str,
    ) -> AgentResult<Vec<PriorDeliverable>> {
        let mut prior = Vec::new();

        for step in self.pipeline.preceding_steps(step_id) {
            if let Some(content) = self.artifacts.get_deliverable(project, &step.id).await? {
                prior.push(PriorDeliverable {
                    step_id: step.id.clone(),
                    agent: step.agent.clone(),
                    content,
                });
            }
        }

        Ok(prior)
    }

    /// Render the prompt text from already-fetched inputs
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        project: &str,
        step_id: &str,
        agent: &str,
        brief: &str,
        prior: &[PriorDeliverable],
        feedback: Option<&str>,
        context: Option<&StepContext>,
    ) -> String {
        let mut prompt = format!("# Project: {}\n\n## Project brief\n{}\n\n", project, brief);

        if !prior.is_empty() {
            prompt.push_str("## Previous deliverables\n\n");
            for deliverable in prior {
                prompt.push_str(&format!(
                    "### {} (by {})\n{}...\n\n",
                    deliverable.step_id,
                    self.pipeline.worker_title(&deliverable.agent),
                    preview(&deliverable.content, PREVIEW_CHARS)
                ));
            }
        }

        if let Some(feedback) = feedback {
            prompt.push_str(&format!(
                "## Previous feedback on this deliverable\n{}\n\n",
                feedback
            ));
        }

        prompt.push_str(&format!(
            "## Your mission\n\
             You are the {} on this project.\n\
             Your task is to produce the deliverable '{}'.\n\n\
             Provide a professional-quality deliverable with a clear, detailed structure.\n",
            self.pipeline.worker_title(agent),
            step_id
        ));

        if let Some(instructions) = context.and_then(|c| c.instructions.as_deref()) {
            prompt.push_str(&format!("\n## Additional context\n{}\n", instructions));
        }

        prompt
    }
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
