use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a project as stored in the relational store
///
/// The workflow engine mirrors its own status here so that listings can be
/// served without loading every workflow snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Brief saved, pipeline not started
    Created,
    /// Pipeline running
    InProgress,
    /// Pipeline paused between steps
    Paused,
    /// Every step reached a terminal status
    Completed,
    /// The pipeline loop aborted
    Failed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Created => write!(f, "created"),
            ProjectStatus::InProgress => write!(f, "in_progress"),
            ProjectStatus::Paused => write!(f, "paused"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Project row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields collected when a project is created through the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectBrief {
    pub name: String,
    pub description: String,
    pub objectives: Option<String>,
    pub target_audience: Option<String>,
    pub constraints: Option<String>,
    pub deadline: Option<String>,
}

impl ProjectBrief {
    /// Renders the brief document handed to the first worker
    pub fn render(&self) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();

        format!(
            "# Project brief: {}\n\n\
             ## Description\n{}\n\n\
             ## Objectives\n{}\n\n\
             ## Target audience\n{}\n\n\
             ## Constraints\n{}\n\n\
             ## Deadline\n{}\n",
            self.name,
            self.description,
            field(&self.objectives),
            field(&self.target_audience),
            field(&self.constraints),
            field(&self.deadline),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_matches_stored_values() {
        assert_eq!(ProjectStatus::Created.to_string(), "created");
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
        assert_eq!(ProjectStatus::Paused.to_string(), "paused");
        assert_eq!(ProjectStatus::Completed.to_string(), "completed");
        assert_eq!(ProjectStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn brief_render_includes_every_section() {
        let brief = ProjectBrief {
            name: "Acme".to_string(),
            description: "Corporate site".to_string(),
            objectives: Some("Leads".to_string()),
            target_audience: None,
            constraints: None,
            deadline: Some("Q3".to_string()),
        };

        let text = brief.render();
        assert!(text.starts_with("# Project brief: Acme"));
        assert!(text.contains("## Description\nCorporate site"));
        assert!(text.contains("## Objectives\nLeads"));
        assert!(text.contains("## Deadline\nQ3"));
    }
}
