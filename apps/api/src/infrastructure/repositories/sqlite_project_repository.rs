use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::project::{Project, ProjectStatus};
use crate::domain::repositories::{ProjectRepository, StoreError, StoreResult};

/// SQLite implementation of ProjectRepository
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, description, status, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(ProjectStatus::Created)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status, created_at FROM projects WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status, created_at FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, created_at
            FROM projects
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn update_status(&self, name: &str, status: ProjectStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE projects SET status = ? WHERE name = ?")
            .bind(status)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("project '{}'", name)));
        }

        Ok(())
    }
}
