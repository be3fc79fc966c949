//! [`PgStore`]: the PostgreSQL implementation of the core storage traits.

use async_trait::async_trait;
use labelhub_core::entities::{Annotation, Dataset, Image, Project};
use labelhub_core::error::CoreError;
use labelhub_core::store::{Account, AccountStore, RefreshSession, Store};
use labelhub_core::types::Timestamp;

use crate::error::into_core_error;
use crate::repositories::{
    AccountRepo, AnnotationRepo, DatasetRepo, ImageRepo, ProjectRepo, SessionRepo,
};
use crate::DbPool;

/// Storage backed by a PostgreSQL pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(into_core_error)
    }

    // --- projects ---

    async fn insert_project(&self, project: &Project) -> Result<(), CoreError> {
        ProjectRepo::create(&self.pool, project)
            .await
            .map_err(into_core_error)
    }

    async fn find_project(&self, id: &str) -> Result<Option<Project>, CoreError> {
        ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(Project::try_from)
            .transpose()
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, CoreError> {
        ProjectRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(into_core_error)?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    async fn update_project(&self, project: &Project) -> Result<bool, CoreError> {
        ProjectRepo::update(&self.pool, project)
            .await
            .map_err(into_core_error)
    }

    async fn delete_project(&self, id: &str) -> Result<bool, CoreError> {
        ProjectRepo::delete(&self.pool, id)
            .await
            .map_err(into_core_error)
    }

    // --- datasets ---

    async fn insert_dataset(&self, dataset: &Dataset) -> Result<(), CoreError> {
        DatasetRepo::create(&self.pool, dataset)
            .await
            .map_err(into_core_error)
    }

    async fn find_dataset(&self, id: &str) -> Result<Option<Dataset>, CoreError> {
        Ok(DatasetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(Dataset::from))
    }

    async fn list_datasets_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Dataset>, CoreError> {
        Ok(DatasetRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(into_core_error)?
            .into_iter()
            .map(Dataset::from)
            .collect())
    }

    async fn update_dataset(&self, dataset: &Dataset) -> Result<bool, CoreError> {
        DatasetRepo::update(&self.pool, dataset)
            .await
            .map_err(into_core_error)
    }

    async fn delete_dataset(&self, id: &str) -> Result<bool, CoreError> {
        DatasetRepo::delete(&self.pool, id)
            .await
            .map_err(into_core_error)
    }

    // --- images ---

    async fn insert_image(&self, image: &Image) -> Result<(), CoreError> {
        ImageRepo::create(&self.pool, image)
            .await
            .map_err(into_core_error)
    }

    async fn find_image(&self, id: &str) -> Result<Option<Image>, CoreError> {
        Ok(ImageRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(Image::from))
    }

    async fn list_images_by_dataset(&self, dataset_id: &str) -> Result<Vec<Image>, CoreError> {
        Ok(ImageRepo::list_by_dataset(&self.pool, dataset_id)
            .await
            .map_err(into_core_error)?
            .into_iter()
            .map(Image::from)
            .collect())
    }

    async fn update_image(&self, image: &Image) -> Result<bool, CoreError> {
        ImageRepo::update(&self.pool, image)
            .await
            .map_err(into_core_error)
    }

    async fn delete_image(&self, id: &str) -> Result<bool, CoreError> {
        ImageRepo::delete(&self.pool, id)
            .await
            .map_err(into_core_error)
    }

    // --- annotations ---

    async fn insert_annotation(&self, annotation: &Annotation) -> Result<(), CoreError> {
        AnnotationRepo::create(&self.pool, annotation)
            .await
            .map_err(into_core_error)
    }

    async fn find_annotation(&self, id: &str) -> Result<Option<Annotation>, CoreError> {
        Ok(AnnotationRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(Annotation::from))
    }

    async fn list_annotations_by_image(
        &self,
        image_id: &str,
    ) -> Result<Vec<Annotation>, CoreError> {
        Ok(AnnotationRepo::list_by_image(&self.pool, image_id)
            .await
            .map_err(into_core_error)?
            .into_iter()
            .map(Annotation::from)
            .collect())
    }

    async fn update_annotation(&self, annotation: &Annotation) -> Result<bool, CoreError> {
        AnnotationRepo::update(&self.pool, annotation)
            .await
            .map_err(into_core_error)
    }

    async fn delete_annotation(&self, id: &str) -> Result<bool, CoreError> {
        AnnotationRepo::delete(&self.pool, id)
            .await
            .map_err(into_core_error)
    }

    // --- aggregates ---

    /// Lock the dataset row, recount from the child tables, commit.
    ///
    /// Concurrent recomputes of the same dataset queue on the row lock, so
    /// the last committed write reflects the children at its commit time.
    async fn recompute_dataset_counts(
        &self,
        dataset_id: &str,
    ) -> Result<Option<Dataset>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(into_core_error)?;

        if !DatasetRepo::lock_for_update(&mut *tx, dataset_id)
            .await
            .map_err(into_core_error)?
        {
            tx.rollback().await.map_err(into_core_error)?;
            return Ok(None);
        }
        let row = DatasetRepo::store_recount(&mut *tx, dataset_id)
            .await
            .map_err(into_core_error)?;

        tx.commit().await.map_err(into_core_error)?;
        Ok(row.map(Dataset::from))
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert_account(&self, account: &Account) -> Result<(), CoreError> {
        AccountRepo::create(&self.pool, account)
            .await
            .map_err(|err| match into_core_error(err) {
                CoreError::Conflict(_) => {
                    CoreError::Conflict("An account with this email already exists".to_string())
                }
                other => other,
            })
    }

    async fn find_account(&self, id: &str) -> Result<Option<Account>, CoreError> {
        Ok(AccountRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core_error)?
            .map(Account::from))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, CoreError> {
        Ok(AccountRepo::find_by_email(&self.pool, email)
            .await
            .map_err(into_core_error)?
            .map(Account::from))
    }

    async fn insert_session(&self, session: &RefreshSession) -> Result<(), CoreError> {
        SessionRepo::create(&self.pool, session)
            .await
            .map_err(into_core_error)
    }

    async fn find_active_session(
        &self,
        refresh_token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<RefreshSession>, CoreError> {
        Ok(
            SessionRepo::find_active_by_hash(&self.pool, refresh_token_hash, now)
                .await
                .map_err(into_core_error)?
                .map(RefreshSession::from),
        )
    }

    async fn is_session_active(&self, id: &str, now: Timestamp) -> Result<bool, CoreError> {
        SessionRepo::is_active(&self.pool, id, now)
            .await
            .map_err(into_core_error)
    }

    async fn revoke_session(&self, id: &str) -> Result<bool, CoreError> {
        SessionRepo::revoke(&self.pool, id)
            .await
            .map_err(into_core_error)
    }

    async fn revoke_sessions_for_user(&self, user_id: &str) -> Result<u64, CoreError> {
        SessionRepo::revoke_all_for_user(&self.pool, user_id)
            .await
            .map_err(into_core_error)
    }
}
