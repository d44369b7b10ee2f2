use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::load_project;
use crate::api::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct DeliverableResponse {
    pub name: String,
    pub content: String,
}

/// GET /api/projects/:id/deliverables/*name
pub async fn get_deliverable(
    State(state): State<AppState>,
    Path((id, name)): Path<(i64, String)>,
) -> Result<Json<DeliverableResponse>, ApiError> {
    let project = load_project(&state, id).await?;
    let content = state
        .artifacts
        .get_deliverable(&project.name, &name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Deliverable not found: {}", name)))?;

    Ok(Json(DeliverableResponse { name, content }))
}
