use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreResult;

/// Revision feedback left on a deliverable
///
/// `status` stays `pending` until a revision cycle consumes it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedbackRecord {
    pub id: i64,
    pub project_id: i64,
    pub step_id: String,
    pub agent: Option<String>,
    pub feedback: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for feedback records
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert a `pending` feedback record, returning its ID
    async fn create(
        &self,
        project_id: i64,
        step_id: &str,
        agent: &str,
        feedback: &str,
    ) -> StoreResult<i64>;

    /// Feedback for one step of a project, oldest first
    async fn list_for_step(&self, project_id: i64, step_id: &str) -> StoreResult<Vec<FeedbackRecord>>;
}
