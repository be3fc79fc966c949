//! Row model for the `annotations` table.

use labelhub_core::entities::Annotation;
use labelhub_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AnnotationRow {
    pub id: EntityId,
    pub image_id: EntityId,
    pub author_id: EntityId,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AnnotationRow> for Annotation {
    fn from(row: AnnotationRow) -> Self {
        Annotation {
            id: row.id,
            image_id: row.image_id,
            author_id: row.author_id,
            payload: row.payload,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
