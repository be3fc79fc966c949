//! Row model for the `datasets` table.

use labelhub_core::entities::Dataset;
use labelhub_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct DatasetRow {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub total_images: i64,
    pub annotated_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DatasetRow> for Dataset {
    fn from(row: DatasetRow) -> Self {
        Dataset {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            total_images: row.total_images,
            annotated_count: row.annotated_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
