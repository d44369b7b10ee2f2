use async_trait::async_trait;

use super::StoreResult;
use crate::domain::project::{Project, ProjectStatus};

/// Repository trait for projects
///
/// Projects are keyed by their unique name; the numeric id is only used by
/// the HTTP layer and as a foreign key.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project with status `created`
    async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<Project>;

    /// Find a project by its unique name
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Project>>;

    /// Find a project by ID
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>>;

    /// All projects, newest first
    async fn list(&self) -> StoreResult<Vec<Project>>;

    /// Overwrite the status field; `NotFound` if no such project
    async fn update_status(&self, name: &str, status: ProjectStatus) -> StoreResult<()>;
}
