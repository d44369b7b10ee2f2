// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod sqlite_feedback_repository;
pub mod sqlite_interaction_repository;
pub mod sqlite_knowledge_repository;
pub mod sqlite_project_repository;

pub use sqlite_feedback_repository::SqliteFeedbackRepository;
pub use sqlite_interaction_repository::SqliteInteractionRepository;
pub use sqlite_knowledge_repository::SqliteKnowledgeRepository;
pub use sqlite_project_repository::SqliteProjectRepository;
