use std::sync::Arc;

use crate::agents::AgentManager;
use crate::config::PipelineConfig;
use crate::domain::repositories::{ArtifactStore, KnowledgeRepository, ProjectRepository};
use crate::workflow::WorkflowRegistry;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ProjectRepository>,
    pub knowledge: Arc<dyn KnowledgeRepository>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub agents: Arc<AgentManager>,
    pub workflows: WorkflowRegistry,
    pub pipeline: Arc<PipelineConfig>,
}
