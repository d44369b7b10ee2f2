use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreResult;

/// Status of one step execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    Processing,
    Completed,
    Failed,
}

/// One row per step execution attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InteractionRecord {
    pub id: i64,
    pub project_id: i64,
    pub agent: String,
    pub step_id: String,
    pub content: Option<String>,
    pub status: InteractionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Repository trait for step interactions
///
/// Rows are created in `processing` state and receive exactly one terminal
/// update.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Open an interaction in `processing` state, returning its ID
    async fn create(&self, project_id: i64, agent: &str, step_id: &str) -> StoreResult<i64>;

    /// Apply the terminal status, content and completion timestamp
    async fn complete(&self, id: i64, status: InteractionStatus, content: &str) -> StoreResult<()>;

    /// Find an interaction by ID
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<InteractionRecord>>;

    /// Every interaction of a project, oldest first
    async fn find_by_project(&self, project_id: i64) -> StoreResult<Vec<InteractionRecord>>;
}
