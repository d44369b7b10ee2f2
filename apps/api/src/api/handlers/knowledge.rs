use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{ApiError, AppState};
use crate::domain::repositories::KnowledgeEntry;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/knowledge
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.knowledge.categories().await?))
}

/// GET /api/knowledge/:category
pub async fn entries_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<KnowledgeEntry>>, ApiError> {
    Ok(Json(state.knowledge.by_category(&category).await?))
}

/// Substring search over content and queries; an empty term matches nothing
///
/// GET /api/knowledge/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<KnowledgeEntry>>, ApiError> {
    let term = params.q.unwrap_or_default();
    if term.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    Ok(Json(state.knowledge.search(term.trim()).await?))
}
