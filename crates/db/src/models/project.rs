//! Row model for the `projects` table.

use labelhub_core::entities::{Project, ProjectStatus};
use labelhub_core::error::CoreError;
use labelhub_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// A project row. `status` is stored as lowercase text.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ProjectRow> for Project {
    type Error = CoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::parse(&row.status)
            .map_err(|_| CoreError::Storage(format!("Unknown project status '{}'", row.status)))?;
        Ok(Project {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
