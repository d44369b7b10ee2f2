use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{agents, deliverables, feedback, health, knowledge, projects, workflow};
use super::state::AppState;

/// Full HTTP surface with tracing and open CORS
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Projects
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/api/projects/:id", get(projects::get_project))
        // Workflow control
        .route("/api/projects/:id/start", post(workflow::start_workflow))
        .route("/api/projects/:id/pause", post(workflow::pause_workflow))
        .route("/api/projects/:id/resume", post(workflow::resume_workflow))
        .route("/api/projects/:id/workflow", get(workflow::workflow_status))
        .route("/api/projects/:id/steps/:step_id", post(workflow::run_step))
        // Artifacts
        .route(
            "/api/projects/:id/deliverables/*name",
            get(deliverables::get_deliverable),
        )
        .route("/api/projects/:id/feedback", post(feedback::submit_feedback))
        // Agents
        .route("/api/agents", get(agents::list_agents))
        .route("/api/agents/:name", post(agents::ask_agent))
        // Knowledge base
        .route("/api/knowledge", get(knowledge::list_categories))
        .route("/api/knowledge/search", get(knowledge::search))
        .route("/api/knowledge/:category", get(knowledge::entries_by_category))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
