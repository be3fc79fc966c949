//! Repository for the `annotations` table.

use labelhub_core::entities::Annotation;
use sqlx::PgPool;

use crate::models::annotation::AnnotationRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, image_id, author_id, payload, created_at, updated_at";

/// Provides CRUD operations for annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    pub async fn create(pool: &PgPool, annotation: &Annotation) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO annotations (id, image_id, author_id, payload, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&annotation.id)
        .bind(&annotation.image_id)
        .bind(&annotation.author_id)
        .bind(&annotation.payload)
        .bind(annotation.created_at)
        .bind(annotation.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<AnnotationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an image's annotations, oldest first.
    pub async fn list_by_image(
        pool: &PgPool,
        image_id: &str,
    ) -> Result<Vec<AnnotationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations WHERE image_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(image_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the payload. `author_id` never changes.
    pub async fn update(pool: &PgPool, annotation: &Annotation) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE annotations SET payload = $2, updated_at = $3 WHERE id = $1")
                .bind(&annotation.id)
                .bind(&annotation.payload)
                .bind(annotation.updated_at)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
