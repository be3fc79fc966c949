//! Repository for the `images` table.

use labelhub_core::entities::Image;
use sqlx::PgPool;

use crate::models::image::ImageRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, dataset_id, uri, metadata, created_at";

/// Provides CRUD operations for images.
pub struct ImageRepo;

impl ImageRepo {
    pub async fn create(pool: &PgPool, image: &Image) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO images (id, dataset_id, uri, metadata, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&image.id)
        .bind(&image.dataset_id)
        .bind(&image.uri)
        .bind(&image.metadata)
        .bind(image.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ImageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a dataset's images, oldest first.
    pub async fn list_by_dataset(
        pool: &PgPool,
        dataset_id: &str,
    ) -> Result<Vec<ImageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE dataset_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ImageRow>(&query)
            .bind(dataset_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(pool: &PgPool, image: &Image) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE images SET uri = $2, metadata = $3 WHERE id = $1")
            .bind(&image.id)
            .bind(&image.uri)
            .bind(&image.metadata)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
