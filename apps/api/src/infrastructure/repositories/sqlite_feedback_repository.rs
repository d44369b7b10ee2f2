use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::repositories::{FeedbackRecord, FeedbackRepository, StoreResult};

/// SQLite implementation of FeedbackRepository
pub struct SqliteFeedbackRepository {
    pool: SqlitePool,
}

impl SqliteFeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for SqliteFeedbackRepository {
    async fn create(
        &self,
        project_id: i64,
        step_id: &str,
        agent: &str,
        feedback: &str,
    ) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO feedback (project_id, step_id, agent, feedback, status, created_at)
            VALUES (?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(project_id)
        .bind(step_id)
        .bind(agent)
        .bind(feedback)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_for_step(&self, project_id: i64, step_id: &str) -> StoreResult<Vec<FeedbackRecord>> {
        let records = sqlx::query_as::<_, FeedbackRecord>(
            r#"
            SELECT id, project_id, step_id, agent, feedback, status, created_at
            FROM feedback
            WHERE project_id = ? AND step_id = ?
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .bind(step_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
