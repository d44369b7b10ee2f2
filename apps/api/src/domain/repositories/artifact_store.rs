use async_trait::async_trait;
use serde::Serialize;

use super::StoreResult;

/// Listing entry for a stored deliverable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliverableSummary {
    pub id: String,
    pub name: String,
    pub agent: Option<String>,
    pub has_feedback: bool,
}

/// Flat-file store for briefs, deliverables and feedback text
///
/// Deliverable ids may carry a trailing `.md`; implementations strip it.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write the project brief, returning its path
    async fn save_brief(&self, project: &str, content: &str) -> StoreResult<String>;

    /// Read the project brief
    async fn get_brief(&self, project: &str) -> StoreResult<Option<String>>;

    /// Write a step deliverable, returning its path
    async fn save_deliverable(
        &self,
        project: &str,
        step_id: &str,
        content: &str,
        agent: &str,
    ) -> StoreResult<String>;

    /// Read a step deliverable
    async fn get_deliverable(&self, project: &str, step_id: &str) -> StoreResult<Option<String>>;

    /// Write feedback on a deliverable, returning its path
    async fn save_feedback(&self, project: &str, step_id: &str, content: &str) -> StoreResult<String>;

    /// Read feedback on a deliverable
    async fn get_feedback(&self, project: &str, step_id: &str) -> StoreResult<Option<String>>;

    /// Deliverables present for a project, sorted by id
    async fn list_deliverables(&self, project: &str) -> StoreResult<Vec<DeliverableSummary>>;
}

/// Strips a trailing `.md` from a deliverable id
pub fn normalize_deliverable_id(id: &str) -> &str {
    id.strip_suffix(".md").unwrap_or(id)
}
