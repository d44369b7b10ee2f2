// HTTP handlers, one module per resource

pub mod agents;
pub mod deliverables;
pub mod feedback;
pub mod health;
pub mod knowledge;
pub mod projects;
pub mod workflow;

use crate::api::{ApiError, AppState};
use crate::domain::project::Project;

/// Resolve a project by numeric id or answer 404
pub(crate) async fn load_project(state: &AppState, id: i64) -> Result<Project, ApiError> {
    state
        .projects
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project not found: {}", id)))
}
