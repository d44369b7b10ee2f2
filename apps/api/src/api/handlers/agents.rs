use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agents::AgentInfo;
use crate::api::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

/// GET /api/agents
pub async fn list_agents(State(state): State<AppState>) -> Json<Vec<AgentInfo>> {
    Json(state.agents.list_agents())
}

/// Free-form question to one worker
///
/// Worker failures are returned as explanatory text, not as an error status.
///
/// POST /api/agents/:name
pub async fn ask_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    let response = state.agents.ask(&name, &req.message).await;
    Ok(Json(AskResponse { response }))
}
