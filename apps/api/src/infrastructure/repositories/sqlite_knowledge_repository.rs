use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::repositories::{
    KnowledgeEntry, KnowledgeRepository, NewKnowledgeEntry, StoreResult,
};

/// SQLite implementation of KnowledgeRepository
pub struct SqliteKnowledgeRepository {
    pool: SqlitePool,
}

impl SqliteKnowledgeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeRepository for SqliteKnowledgeRepository {
    async fn record(&self, entry: NewKnowledgeEntry) -> StoreResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO knowledge (agent, category, query, content, project_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.agent)
        .bind(&entry.category)
        .bind(&entry.query)
        .bind(&entry.content)
        .bind(entry.project_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn categories(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT category FROM knowledge ORDER BY category")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    async fn by_category(&self, category: &str) -> StoreResult<Vec<KnowledgeEntry>> {
        let entries = sqlx::query_as::<_, KnowledgeEntry>(
            r#"
            SELECT id, agent, category, query, content, project_id, created_at
            FROM knowledge
            WHERE category = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<KnowledgeEntry>> {
        let pattern = format!("%{}%", term);
        let entries = sqlx::query_as::<_, KnowledgeEntry>(
            r#"
            SELECT id, agent, category, query, content, project_id, created_at
            FROM knowledge
            WHERE content LIKE ? OR query LIKE ?
            ORDER BY created_at DESC, id DESC
            LIMIT 50
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
