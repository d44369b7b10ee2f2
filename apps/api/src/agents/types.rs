use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::repositories::{
    ArtifactStore, FeedbackRepository, InteractionRepository, KnowledgeRepository,
    ProjectRepository,
};

/// Public description of a worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub title: String,
    pub description: String,
}

/// What the startup bootstrap found and did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub existing: Vec<String>,
    pub created: Vec<String>,
    pub failed: Vec<String>,
}

/// External stores the agent system reads and writes
#[derive(Clone)]
pub struct AgentStores {
    pub projects: Arc<dyn ProjectRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub knowledge: Arc<dyn KnowledgeRepository>,
    pub artifacts: Arc<dyn ArtifactStore>,
}
