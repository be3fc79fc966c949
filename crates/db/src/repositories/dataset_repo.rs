//! Repository for the `datasets` table.

use labelhub_core::entities::Dataset;
use sqlx::{PgConnection, PgPool};

use crate::models::dataset::DatasetRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, description, total_images, annotated_count, \
                       created_at, updated_at";

/// Provides CRUD operations and aggregate maintenance for datasets.
pub struct DatasetRepo;

impl DatasetRepo {
    /// Insert a dataset. The aggregate columns start at whatever the caller
    /// passes (zero for new datasets).
    pub async fn create(pool: &PgPool, dataset: &Dataset) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO datasets
                (id, project_id, name, description, total_images, annotated_count, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&dataset.id)
        .bind(&dataset.project_id)
        .bind(&dataset.name)
        .bind(&dataset.description)
        .bind(dataset.total_images)
        .bind(dataset.annotated_count)
        .bind(dataset.created_at)
        .bind(dataset.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<DatasetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM datasets WHERE id = $1");
        sqlx::query_as::<_, DatasetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's datasets, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<DatasetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM datasets WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, DatasetRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update name, description and `updated_at`. Aggregates are untouched.
    pub async fn update(pool: &PgPool, dataset: &Dataset) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE datasets SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(&dataset.id)
        .bind(&dataset.name)
        .bind(&dataset.description)
        .bind(dataset.updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Take a row lock on the dataset for the rest of the transaction.
    ///
    /// Returns `false` if the dataset does not exist.
    pub async fn lock_for_update(conn: &mut PgConnection, id: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM datasets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(row.is_some())
    }

    /// Recount both aggregates from the child rows and store them.
    pub async fn store_recount(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<DatasetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE datasets SET
                total_images = (SELECT COUNT(*) FROM images WHERE dataset_id = $1),
                annotated_count = (
                    SELECT COUNT(*) FROM images i
                    WHERE i.dataset_id = $1
                      AND EXISTS (SELECT 1 FROM annotations a WHERE a.image_id = i.id)
                )
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DatasetRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
