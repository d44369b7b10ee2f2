use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::repositories::{
    InteractionRecord, InteractionRepository, InteractionStatus, StoreError, StoreResult,
};

/// SQLite implementation of InteractionRepository
pub struct SqliteInteractionRepository {
    pool: SqlitePool,
}

impl SqliteInteractionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionRepository for SqliteInteractionRepository {
    async fn create(&self, project_id: i64, agent: &str, step_id: &str) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO interactions (project_id, agent, step_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(agent)
        .bind(step_id)
        .bind(InteractionStatus::Processing)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn complete(&self, id: i64, status: InteractionStatus, content: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE interactions SET status = ?, content = ?, completed_at = ? WHERE id = ?",
        )
        .bind(status)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("interaction {}", id)));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<InteractionRecord>> {
        let record = sqlx::query_as::<_, InteractionRecord>(
            r#"
            SELECT id, project_id, agent, step_id, content, status, created_at, completed_at
            FROM interactions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_project(&self, project_id: i64) -> StoreResult<Vec<InteractionRecord>> {
        let records = sqlx::query_as::<_, InteractionRecord>(
            r#"
            SELECT id, project_id, agent, step_id, content, status, created_at, completed_at
            FROM interactions
            WHERE project_id = ?
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
