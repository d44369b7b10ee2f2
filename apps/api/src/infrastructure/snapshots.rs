use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::files::{project_dir, read_optional, write_atomic};
use crate::domain::repositories::{SnapshotStore, StoreResult};
use crate::domain::workflow::WorkflowState;

const SNAPSHOT_FILE: &str = "workflow_state.json";

/// Workflow snapshots as pretty-printed JSON under each project directory
///
/// Writes go through a temp file and a rename, so readers only ever see a
/// complete document.
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, project: &str) -> std::io::Result<PathBuf> {
        Ok(project_dir(&self.root, project)?
            .join("workflow")
            .join(SNAPSHOT_FILE))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, state: &WorkflowState) -> StoreResult<()> {
        let path = self.path(&state.project_name)?;
        let json = serde_json::to_vec_pretty(state)?;
        write_atomic(&path, &json).await?;

        debug!(project = %state.project_name, status = %state.status, "Workflow snapshot saved");
        Ok(())
    }

    async fn load(&self, project: &str) -> StoreResult<Option<WorkflowState>> {
        let path = self.path(project)?;
        match read_optional(&path).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
