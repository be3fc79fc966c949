use chrono::Utc;

use super::{active, ensure_readable, ensure_writable, require_identity, Gateway};
use crate::access::Resource;
use crate::entities::{CreateDataset, Dataset, UpdateDataset};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::types::new_id;

impl Gateway {
    /// Datasets of a project, oldest first.
    pub async fn list_datasets(
        &self,
        identity: Option<&Identity>,
        project_id: &str,
    ) -> Result<Vec<Dataset>, CoreError> {
        let project = self.get_project(identity, project_id).await?;
        let mut datasets = self.store.list_datasets_by_project(&project.id).await?;
        datasets.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(datasets)
    }

    pub async fn get_dataset(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<Dataset, CoreError> {
        let identity = active(identity).ok_or_else(|| CoreError::not_found("Dataset", id))?;
        let (dataset, project) = self.load_dataset_chain(id).await?;
        ensure_readable(
            identity,
            &Resource::Dataset {
                dataset: &dataset,
                project: &project,
            },
        )?;
        Ok(dataset)
    }

    /// Create a dataset inside `project_id`. Counts start at zero.
    pub async fn create_dataset(
        &self,
        identity: Option<&Identity>,
        project_id: &str,
        input: &CreateDataset,
    ) -> Result<Dataset, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let project = self.load_project(project_id).await?;
        ensure_writable(identity, &Resource::Project(&project))?;

        let now = Utc::now();
        let dataset = Dataset {
            id: new_id(),
            project_id: project.id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            total_images: 0,
            annotated_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_dataset(&dataset).await?;

        tracing::info!(dataset_id = %dataset.id, project_id = %project.id, "Dataset created");
        Ok(dataset)
    }

    pub async fn update_dataset(
        &self,
        identity: Option<&Identity>,
        id: &str,
        input: &UpdateDataset,
    ) -> Result<Dataset, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let (mut dataset, project) = self.load_dataset_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Dataset {
                dataset: &dataset,
                project: &project,
            },
        )?;

        input.apply(&mut dataset);
        dataset.updated_at = Utc::now();
        if !self.store.update_dataset(&dataset).await? {
            return Err(CoreError::not_found("Dataset", id));
        }
        // Re-read so the returned aggregates are the stored ones.
        self.store
            .find_dataset(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Dataset", id))
    }

    /// Delete a dataset together with its images and annotations.
    pub async fn delete_dataset(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), CoreError> {
        let identity = require_identity(identity)?;
        let (dataset, project) = self.load_dataset_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Dataset {
                dataset: &dataset,
                project: &project,
            },
        )?;

        if !self.store.delete_dataset(id).await? {
            return Err(CoreError::not_found("Dataset", id));
        }
        tracing::info!(dataset_id = %id, project_id = %project.id, "Dataset deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::entities::CreateProject;
    use crate::gateway::test_support::{gateway, identity};

    fn dataset_named(name: &str) -> CreateDataset {
        CreateDataset {
            name: name.into(),
            description: None,
        }
    }

    async fn project_for(gw: &Gateway, owner: &Identity) -> String {
        gw.create_project(
            Some(owner),
            &CreateProject {
                name: "P".into(),
                description: None,
                status: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_and_list_in_creation_order() {
        let (gw, _) = gateway();
        let u1 = identity("u1");
        let project_id = project_for(&gw, &u1).await;

        let first = gw
            .create_dataset(Some(&u1), &project_id, &dataset_named("first"))
            .await
            .unwrap();
        let second = gw
            .create_dataset(Some(&u1), &project_id, &dataset_named("second"))
            .await
            .unwrap();
        assert_eq!(first.total_images, 0);
        assert_eq!(first.project_id, project_id);

        let listed = gw.list_datasets(Some(&u1), &project_id).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, [first.id.as_str(), second.id.as_str()]);
    }

    #[tokio::test]
    async fn test_nested_access_uses_the_same_not_found_policy() {
        let (gw, _) = gateway();
        let owner = identity("owner");
        let other = identity("other");
        let project_id = project_for(&gw, &owner).await;
        let dataset = gw
            .create_dataset(Some(&owner), &project_id, &dataset_named("d"))
            .await
            .unwrap();

        assert_matches!(
            gw.get_dataset(Some(&other), &dataset.id).await,
            Err(CoreError::NotFound { entity: "Dataset", .. })
        );
        assert_matches!(
            gw.get_dataset(None, &dataset.id).await,
            Err(CoreError::NotFound { entity: "Dataset", .. })
        );
        assert_matches!(
            gw.list_datasets(Some(&other), &project_id).await,
            Err(CoreError::NotFound { entity: "Project", .. })
        );
        assert_matches!(
            gw.create_dataset(Some(&other), &project_id, &dataset_named("x"))
                .await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            gw.delete_dataset(Some(&other), &dataset.id).await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            gw.create_dataset(None, &project_id, &dataset_named("x")).await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn test_update_keeps_stored_aggregates() {
        let (gw, _) = gateway();
        let u1 = identity("u1");
        let project_id = project_for(&gw, &u1).await;
        let dataset = gw
            .create_dataset(Some(&u1), &project_id, &dataset_named("d"))
            .await
            .unwrap();
        gw.create_image(
            Some(&u1),
            &dataset.id,
            &crate::entities::CreateImage {
                uri: "/img/1.png".into(),
                metadata: None,
            },
        )
        .await
        .unwrap();

        let patch = UpdateDataset {
            name: Some("renamed".into()),
            description: None,
        };
        let updated = gw.update_dataset(Some(&u1), &dataset.id, &patch).await.unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.total_images, 1);
    }

    #[tokio::test]
    async fn test_deleting_a_project_removes_its_datasets() {
        let (gw, _) = gateway();
        let u1 = identity("u1");
        let project_id = project_for(&gw, &u1).await;
        let dataset = gw
            .create_dataset(Some(&u1), &project_id, &dataset_named("d"))
            .await
            .unwrap();

        gw.delete_project(Some(&u1), &project_id).await.unwrap();
        assert_matches!(
            gw.get_dataset(Some(&u1), &dataset.id).await,
            Err(CoreError::NotFound { .. })
        );
    }
}
