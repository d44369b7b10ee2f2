use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use super::load_project;
use crate::api::{ApiError, AppState};
use crate::domain::project::{Project, ProjectBrief};
use crate::domain::repositories::DeliverableSummary;

/// Project with the deliverables produced so far
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub deliverables: Vec<DeliverableSummary>,
}

/// List projects, newest first
///
/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.projects.list().await?))
}

/// Create a project and save its brief
///
/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(brief): Json<ProjectBrief>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let name = brief.name.trim();
    if name.is_empty() || brief.description.trim().is_empty() {
        return Err(ApiError::bad_request("Name and description are required"));
    }

    if state.projects.find_by_name(name).await?.is_some() {
        return Err(ApiError::conflict(format!("Project already exists: {}", name)));
    }

    let brief = ProjectBrief {
        name: name.to_string(),
        ..brief
    };
    state.artifacts.save_brief(&brief.name, &brief.render()).await?;

    let project = state
        .projects
        .create(&brief.name, Some(brief.description.as_str()))
        .await?;

    info!(project = %project.name, id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project and its deliverable listing
///
/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = load_project(&state, id).await?;
    let deliverables = state.artifacts.list_deliverables(&project.name).await?;

    Ok(Json(ProjectDetail {
        project,
        deliverables,
    }))
}
