// Repository interfaces (ports)
// Infrastructure adapters implement these traits

pub mod artifact_store;
pub mod feedback_repository;
pub mod interaction_repository;
pub mod knowledge_repository;
pub mod project_repository;
pub mod snapshot_store;

pub use artifact_store::{ArtifactStore, DeliverableSummary};
pub use feedback_repository::{FeedbackRecord, FeedbackRepository};
pub use interaction_repository::{InteractionRecord, InteractionRepository, InteractionStatus};
pub use knowledge_repository::{KnowledgeEntry, KnowledgeRepository, NewKnowledgeEntry};
pub use project_repository::ProjectRepository;
pub use snapshot_store::SnapshotStore;

use thiserror::Error;

/// Errors raised by store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
