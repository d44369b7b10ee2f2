use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreResult;

/// Category used when a worker exchange is logged without one
pub const DEFAULT_CATEGORY: &str = "Général";

/// Knowledge log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct KnowledgeEntry {
    pub id: i64,
    pub agent: String,
    pub category: String,
    pub query: Option<String>,
    pub content: String,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append to the knowledge log
#[derive(Debug, Clone)]
pub struct NewKnowledgeEntry {
    pub agent: String,
    pub category: String,
    pub query: Option<String>,
    pub content: String,
    pub project_id: Option<i64>,
}

impl NewKnowledgeEntry {
    /// A worker exchange filed under the default category
    pub fn exchange(agent: &str, query: &str, response: &str, project_id: Option<i64>) -> Self {
        Self {
            agent: agent.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            query: Some(query.to_string()),
            content: response.to_string(),
            project_id,
        }
    }
}

/// Append-only audit log of worker exchanges
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    /// Append an entry, returning its ID
    async fn record(&self, entry: NewKnowledgeEntry) -> StoreResult<i64>;

    /// Distinct categories
    async fn categories(&self) -> StoreResult<Vec<String>>;

    /// Entries in one category
    async fn by_category(&self, category: &str) -> StoreResult<Vec<KnowledgeEntry>>;

    /// Entries whose content or query contains `term`
    async fn search(&self, term: &str) -> StoreResult<Vec<KnowledgeEntry>>;
}
