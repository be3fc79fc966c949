//! Row model for the `images` table.

use labelhub_core::entities::Image;
use labelhub_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// An image row. `metadata` is a JSONB object.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub id: EntityId,
    pub dataset_id: EntityId,
    pub uri: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Image {
            id: row.id,
            dataset_id: row.dataset_id,
            uri: row.uri,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}
