use async_trait::async_trait;

use super::StoreResult;
use crate::domain::workflow::WorkflowState;

/// Durable storage for workflow snapshots, keyed by project name
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot for `state.project_name`
    async fn save(&self, state: &WorkflowState) -> StoreResult<()>;

    /// Latest snapshot, or `None` when the project has no saved state
    async fn load(&self, project: &str) -> StoreResult<Option<WorkflowState>>;
}
