//! Filesystem adapters rooted at the data directory
//!
//! ```text
//! <data>/projects/<project>/
//!     brief/initial_brief.md, brief_meta.json
//!     deliverables/<step_id>.md, <step_id>_meta.json
//!     feedback/<step_id>_feedback.md, <step_id>_feedback_meta.json
//!     workflow/workflow_state.json
//! ```

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::repositories::artifact_store::normalize_deliverable_id;
use crate::domain::repositories::{ArtifactStore, DeliverableSummary, StoreResult};

const BRIEF_FILE: &str = "initial_brief.md";

/// Reject values that are not a single plain path component
fn ensure_component(value: &str, what: &str) -> io::Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\'])
        && !value.contains('\0');

    if !valid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid {} '{}'", what, value),
        ));
    }

    Ok(())
}

/// Per-project directory, rejecting names that would escape the data root
pub(crate) fn project_dir(root: &Path, project: &str) -> io::Result<PathBuf> {
    ensure_component(project, "project name")?;
    Ok(root.join("projects").join(project))
}

/// Normalized step id, rejecting ids that would escape the project directory
pub(crate) fn step_component(step_id: &str) -> io::Result<&str> {
    let step_id = normalize_deliverable_id(step_id);
    ensure_component(step_id, "step id")?;
    Ok(step_id)
}

/// Write `content` next to `path` and rename it into place
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await
}

/// `Ok(None)` when the file does not exist
pub(crate) async fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactMeta {
    project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

/// Markdown artifacts on the local filesystem
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir(&self, project: &str, section: &str) -> io::Result<PathBuf> {
        Ok(project_dir(&self.root, project)?.join(section))
    }

    async fn write_with_meta(
        &self,
        file: PathBuf,
        meta_file: PathBuf,
        content: &str,
        meta: ArtifactMeta,
    ) -> StoreResult<String> {
        write_atomic(&file, content.as_bytes()).await?;

        let meta = serde_json::to_vec_pretty(&meta)?;
        if let Err(e) = write_atomic(&meta_file, &meta).await {
            warn!(path = %meta_file.display(), error = %e, "Failed to write artifact metadata");
        }

        debug!(path = %file.display(), "Artifact written");
        Ok(file.to_string_lossy().into_owned())
    }

    async fn read_meta(&self, path: &Path) -> Option<ArtifactMeta> {
        let raw = read_optional(path).await.ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn save_brief(&self, project: &str, content: &str) -> StoreResult<String> {
        let dir = self.dir(project, "brief")?;
        let meta = ArtifactMeta {
            project: project.to_string(),
            step_id: None,
            agent: None,
            created_at: Utc::now(),
        };

        self.write_with_meta(dir.join(BRIEF_FILE), dir.join("brief_meta.json"), content, meta)
            .await
    }

    async fn get_brief(&self, project: &str) -> StoreResult<Option<String>> {
        let path = self.dir(project, "brief")?.join(BRIEF_FILE);
        Ok(read_optional(&path).await?)
    }

    async fn save_deliverable(
        &self,
        project: &str,
        step_id: &str,
        content: &str,
        agent: &str,
    ) -> StoreResult<String> {
        let step_id = step_component(step_id)?;
        let dir = self.dir(project, "deliverables")?;
        let meta = ArtifactMeta {
            project: project.to_string(),
            step_id: Some(step_id.to_string()),
            agent: Some(agent.to_string()),
            created_at: Utc::now(),
        };

        self.write_with_meta(
            dir.join(format!("{}.md", step_id)),
            dir.join(format!("{}_meta.json", step_id)),
            content,
            meta,
        )
        .await
    }

    async fn get_deliverable(&self, project: &str, step_id: &str) -> StoreResult<Option<String>> {
        let step_id = step_component(step_id)?;
        let path = self
            .dir(project, "deliverables")?
            .join(format!("{}.md", step_id));
        Ok(read_optional(&path).await?)
    }

    async fn save_feedback(&self, project: &str, step_id: &str, content: &str) -> StoreResult<String> {
        let step_id = step_component(step_id)?;
        let dir = self.dir(project, "feedback")?;
        let meta = ArtifactMeta {
            project: project.to_string(),
            step_id: Some(step_id.to_string()),
            agent: None,
            created_at: Utc::now(),
        };

        self.write_with_meta(
            dir.join(format!("{}_feedback.md", step_id)),
            dir.join(format!("{}_feedback_meta.json", step_id)),
            content,
            meta,
        )
        .await
    }

    async fn get_feedback(&self, project: &str, step_id: &str) -> StoreResult<Option<String>> {
        let step_id = step_component(step_id)?;
        let path = self
            .dir(project, "feedback")?
            .join(format!("{}_feedback.md", step_id));
        Ok(read_optional(&path).await?)
    }

    async fn list_deliverables(&self, project: &str) -> StoreResult<Vec<DeliverableSummary>> {
        let dir = self.dir(project, "deliverables")?;
        let feedback_dir = self.dir(project, "feedback")?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut deliverables = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(id) = file_name.strip_suffix(".md") else {
                continue;
            };

            let agent = self
                .read_meta(&dir.join(format!("{}_meta.json", id)))
                .await
                .and_then(|meta| meta.agent);
            let has_feedback = tokio::fs::try_exists(feedback_dir.join(format!("{}_feedback.md", id)))
                .await
                .unwrap_or(false);

            deliverables.push(DeliverableSummary {
                id: id.to_string(),
                name: file_name.clone(),
                agent,
                has_feedback,
            });
        }

        deliverables.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(deliverables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_dir_rejects_traversal() {
        let root = Path::new("/data");
        assert!(project_dir(root, "acme").is_ok());
        assert!(project_dir(root, "..").is_err());
        assert!(project_dir(root, "a/b").is_err());
        assert!(project_dir(root, "").is_err());
    }

    #[test]
    fn step_ids_reject_traversal() {
        assert_eq!(step_component("01_strategic_brief.md").unwrap(), "01_strategic_brief");
        for step_id in ["", ".", "..", ".md", "../../beta/deliverables/01", "a\\b", "a\0b"] {
            let err = step_component(step_id).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{:?}", step_id);
        }
    }

    #[tokio::test]
    async fn deliverables_cannot_be_read_across_projects() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        let store = FsArtifactStore::new(&data);

        store
            .save_deliverable("beta", "01_strategic_brief", "beta only", "vision")
            .await
            .unwrap();
        store
            .save_deliverable("alpha", "01_strategic_brief", "alpha", "vision")
            .await
            .unwrap();
        tokio::fs::write(tmp.path().join("outside.md"), "outside").await.unwrap();

        for step_id in [
            "../../beta/deliverables/01_strategic_brief",
            "../../../../outside",
            "../../../../outside.md",
        ] {
            assert!(store.get_deliverable("alpha", step_id).await.is_err(), "{}", step_id);
            assert!(store.get_feedback("alpha", step_id).await.is_err(), "{}", step_id);
        }
        assert!(store
            .save_deliverable("alpha", "../escape", "x", "vision")
            .await
            .is_err());
        assert!(store.save_feedback("alpha", "../escape", "x").await.is_err());
        assert!(!data.join("projects").join("alpha").join("escape.md").exists());
    }

    #[tokio::test]
    async fn deliverables_are_listed_with_agent_and_feedback() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path());

        store
            .save_deliverable("acme", "02_ux_design", "wireframes", "pixel")
            .await
            .unwrap();
        store
            .save_deliverable("acme", "01_strategic_brief.md", "strategy", "vision")
            .await
            .unwrap();
        store
            .save_feedback("acme", "01_strategic_brief", "more detail")
            .await
            .unwrap();

        let listed = store.list_deliverables("acme").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "01_strategic_brief");
        assert_eq!(listed[0].name, "01_strategic_brief.md");
        assert_eq!(listed[0].agent.as_deref(), Some("vision"));
        assert!(listed[0].has_feedback);
        assert!(!listed[1].has_feedback);

        let content = store
            .get_deliverable("acme", "01_strategic_brief.md")
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("strategy"));
    }

    #[tokio::test]
    async fn missing_artifacts_read_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path());

        assert!(store.get_brief("ghost").await.unwrap().is_none());
        assert!(store.get_deliverable("ghost", "01").await.unwrap().is_none());
        assert!(store.list_deliverables("ghost").await.unwrap().is_empty());
    }
}
