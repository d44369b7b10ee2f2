//! Per-project workflow engines shared across request handlers
//!
//! Each project gets exactly one `ProjectWorkflow` per process, so two
//! concurrent `start` requests observe the same state and lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::engine::{ProjectWorkflow, WorkflowDeps};
use super::errors::WorkflowResult;

pub struct WorkflowRegistry {
    deps: WorkflowDeps,
    workflows: Arc<Mutex<HashMap<String, ProjectWorkflow>>>,
}

impl WorkflowRegistry {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            deps,
            workflows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn deps(&self) -> &WorkflowDeps {
        &self.deps
    }

    /// Engine for `project`, loading its snapshot or creating a fresh one
    ///
    /// The map stays locked while the engine is opened so that two callers
    /// can never build competing engines for the same project.
    pub async fn get_or_load(&self, project: &str) -> WorkflowResult<ProjectWorkflow> {
        let mut workflows = self.workflows.lock().await;
        if let Some(workflow) = workflows.get(project) {
            return Ok(workflow.clone());
        }

        let workflow = ProjectWorkflow::open(project, self.deps.clone()).await?;
        workflows.insert(project.to_string(), workflow.clone());
        Ok(workflow)
    }

    /// Engine already held in memory, without touching storage
    pub async fn get(&self, project: &str) -> Option<ProjectWorkflow> {
        self.workflows.lock().await.get(project).cloned()
    }

    /// Cancel every running loop and wait for it to reach a step boundary
    pub async fn shutdown(&self) {
        let workflows: Vec<ProjectWorkflow> = {
            let mut map = self.workflows.lock().await;
            map.drain().map(|(_, workflow)| workflow).collect()
        };

        info!(count = workflows.len(), "Shutting down workflows");
        for workflow in workflows {
            workflow.shutdown().await;
        }
    }
}

impl Clone for WorkflowRegistry {
    fn clone(&self) -> Self {
        Self {
            deps: self.deps.clone(),
            workflows: Arc::clone(&self.workflows),
        }
    }
}
