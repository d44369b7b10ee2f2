use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::load_project;
use crate::api::{ApiError, AppState};
use crate::domain::repositories::artifact_store::normalize_deliverable_id;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackRequest {
    pub deliverable: String,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub status: &'static str,
    pub feedback_id: i64,
    pub step_id: String,
    pub agent: String,
}

/// Record feedback on a deliverable for its owning worker
///
/// POST /api/projects/:id/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    if req.deliverable.trim().is_empty() || req.feedback.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Deliverable name and feedback content are required",
        ));
    }

    let project = load_project(&state, id).await?;
    let step_id = normalize_deliverable_id(&req.deliverable);
    let agent = state
        .pipeline
        .agent_for_step(step_id)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown deliverable: {}", req.deliverable)))?;

    let receipt = state
        .agents
        .process_feedback(&project.name, step_id, &req.feedback, agent)
        .await?;

    Ok(Json(FeedbackResponse {
        status: "feedback_received",
        feedback_id: receipt.feedback_id,
        step_id: receipt.step_id,
        agent: agent.to_string(),
    }))
}
