use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::backend::TextGenerator;
use super::errors::AgentResult;
use super::feedback::{FeedbackIntake, FeedbackReceipt};
use super::gateway::WorkerGateway;
use super::processor::{StepExecutor, StepProcessor};
use super::prompts::{PromptComposer, StepContext};
use super::types::{AgentInfo, AgentStores, BootstrapReport};
use crate::config::PipelineConfig;
use crate::domain::workflow::StepOutcome;

/// Entry point to the agent system for the HTTP layer and the workflow engine
///
/// Owns the worker gateway, the step processor and the feedback intake, all
/// built from one pipeline config so their step and agent lookups agree.
pub struct AgentManager {
    pipeline: Arc<PipelineConfig>,
    backend: Arc<dyn TextGenerator>,
    gateway: Arc<WorkerGateway>,
    processor: Arc<StepProcessor>,
    feedback: FeedbackIntake,
}

impl AgentManager {
    /// Wire the agent system around a backend and the external stores
    pub fn new(
        pipeline: Arc<PipelineConfig>,
        backend: Arc<dyn TextGenerator>,
        stores: AgentStores,
        worker_timeout: Option<Duration>,
    ) -> Self {
        let gateway = Arc::new(
            WorkerGateway::new(
                backend.clone(),
                stores.knowledge.clone(),
                pipeline.worker_names(),
            )
            .with_timeout(worker_timeout),
        );

        let composer = PromptComposer::new(pipeline.clone(), stores.artifacts.clone());
        let processor = Arc::new(StepProcessor::new(
            stores.projects.clone(),
            stores.interactions.clone(),
            stores.artifacts.clone(),
            composer,
            gateway.clone(),
            pipeline.generation,
        ));

        let feedback = FeedbackIntake::new(
            stores.projects,
            stores.feedback,
            stores.artifacts,
            pipeline.clone(),
        );

        info!(workers = pipeline.workers.len(), steps = pipeline.steps.len(), "AgentManager initialised");

        Self {
            pipeline,
            backend,
            gateway,
            processor,
            feedback,
        }
    }

    /// Step executor handed to workflow engines
    pub fn executor(&self) -> Arc<dyn StepExecutor> {
        self.processor.clone()
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Run one pipeline step
    pub async fn process_step(
        &self,
        project: &str,
        step_id: &str,
        agent: &str,
        context: Option<&StepContext>,
    ) -> StepOutcome {
        self.processor.process(project, step_id, agent, context).await
    }

    /// Record revision feedback on a deliverable
    pub async fn process_feedback(
        &self,
        project: &str,
        deliverable_id: &str,
        text: &str,
        agent: &str,
    ) -> AgentResult<FeedbackReceipt> {
        self.feedback.submit(project, deliverable_id, text, agent).await
    }

    /// Free-form question to a worker; errors come back as text
    pub async fn ask(&self, agent: &str, message: &str) -> String {
        self.gateway.ask(agent, message, self.pipeline.generation).await
    }

    /// Every configured worker with its title and description
    pub fn list_agents(&self) -> Vec<AgentInfo> {
        self.pipeline
            .workers
            .iter()
            .map(|w| AgentInfo {
                name: w.name.clone(),
                title: w.title.clone(),
                description: w.description.clone(),
            })
            .collect()
    }

    /// Make sure every configured worker exists on the backend
    ///
    /// Missing workers are created from `<modelfiles_dir>/<name>.modelfile`.
    /// Individual failures are reported, not raised.
    pub async fn ensure_agents_exist(&self, modelfiles_dir: &Path) -> AgentResult<BootstrapReport> {
        let available = self.backend.list_available().await?;
        let mut report = BootstrapReport::default();

        for worker in &self.pipeline.workers {
            let name = &worker.name;
            let present = available
                .iter()
                .any(|a| a == name || a.strip_suffix(":latest") == Some(name.as_str()));

            if present {
                info!(agent = %name, "Agent already exists");
                report.existing.push(name.clone());
                continue;
            }

            warn!(agent = %name, "Agent missing, creating");
            let path = modelfiles_dir.join(format!("{}.modelfile", name));
            let definition = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    error!(agent = %name, path = %path.display(), error = %e, "Modelfile not readable");
                    report.failed.push(name.clone());
                    continue;
                }
            };

            match self.backend.create(name, &definition).await {
                Ok(()) => {
                    info!(agent = %name, "Agent created");
                    report.created.push(name.clone());
                }
                Err(e) => {
                    error!(agent = %name, error = %e, "Agent creation failed");
                    report.failed.push(name.clone());
                }
            }
        }

        Ok(report)
    }
}
