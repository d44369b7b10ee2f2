use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::load_project;
use crate::agents::StepContext;
use crate::api::{ApiError, AppState};
use crate::domain::workflow::StepOutcome;
use crate::workflow::WorkflowReport;

/// Optional body for a manual step run
#[derive(Debug, Default, Deserialize)]
pub struct RunStepRequest {
    pub instructions: Option<String>,
}

/// Start the project's pipeline in the background
///
/// POST /api/projects/:id/start
pub async fn start_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let project = load_project(&state, id).await?;
    let workflow = state.workflows.get_or_load(&project.name).await?;
    let started = workflow.start().await?;

    Ok(Json(json!({ "started": started })))
}

/// Pause after the in-flight step
///
/// POST /api/projects/:id/pause
pub async fn pause_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let project = load_project(&state, id).await?;
    let workflow = state.workflows.get_or_load(&project.name).await?;
    let paused = workflow.pause().await?;

    Ok(Json(json!({ "paused": paused })))
}

/// Resume a paused pipeline from its saved step
///
/// POST /api/projects/:id/resume
pub async fn resume_workflow(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let project = load_project(&state, id).await?;
    let workflow = state.workflows.get_or_load(&project.name).await?;
    let resumed = workflow.resume().await?;

    Ok(Json(json!({ "resumed": resumed })))
}

/// GET /api/projects/:id/workflow
pub async fn workflow_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkflowReport>, ApiError> {
    let project = load_project(&state, id).await?;
    let workflow = state.workflows.get_or_load(&project.name).await?;

    Ok(Json(workflow.status().await))
}

/// Run one step outside the pipeline loop
///
/// The step is executed synchronously and its outcome returned; the
/// workflow snapshot is left untouched.
///
/// POST /api/projects/:id/steps/:step_id
pub async fn run_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(i64, String)>,
    body: Option<Json<RunStepRequest>>,
) -> Result<Json<StepOutcome>, ApiError> {
    let project = load_project(&state, id).await?;
    let agent = state
        .pipeline
        .agent_for_step(&step_id)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown step: {}", step_id)))?;

    let context = body.map(|Json(req)| StepContext {
        instructions: req.instructions,
    });

    let outcome = state
        .agents
        .process_step(&project.name, &step_id, agent, context.as_ref())
        .await;

    Ok(Json(outcome))
}
