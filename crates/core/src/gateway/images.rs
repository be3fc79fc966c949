use chrono::Utc;

use super::{active, ensure_readable, ensure_writable, require_identity, Gateway};
use crate::access::Resource;
use crate::entities::{CreateImage, Image, UpdateImage};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::types::new_id;

impl Gateway {
    /// Images of a dataset, oldest first.
    pub async fn list_images(
        &self,
        identity: Option<&Identity>,
        dataset_id: &str,
    ) -> Result<Vec<Image>, CoreError> {
        let dataset = self.get_dataset(identity, dataset_id).await?;
        let mut images = self.store.list_images_by_dataset(&dataset.id).await?;
        images.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(images)
    }

    pub async fn get_image(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<Image, CoreError> {
        let identity = active(identity).ok_or_else(|| CoreError::not_found("Image", id))?;
        let (image, dataset, project) = self.load_image_chain(id).await?;
        ensure_readable(
            identity,
            &Resource::Image {
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;
        Ok(image)
    }

    /// Register an image in `dataset_id` and recount the dataset.
    pub async fn create_image(
        &self,
        identity: Option<&Identity>,
        dataset_id: &str,
        input: &CreateImage,
    ) -> Result<Image, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let (dataset, project) = self.load_dataset_chain(dataset_id).await?;
        ensure_writable(
            identity,
            &Resource::Dataset {
                dataset: &dataset,
                project: &project,
            },
        )?;

        let image = Image {
            id: new_id(),
            dataset_id: dataset.id.clone(),
            uri: input.uri.clone(),
            metadata: input
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            created_at: Utc::now(),
        };
        self.store.insert_image(&image).await?;
        self.refresh_aggregates(&dataset.id).await?;

        tracing::info!(image_id = %image.id, dataset_id = %dataset.id, "Image added");
        Ok(image)
    }

    pub async fn update_image(
        &self,
        identity: Option<&Identity>,
        id: &str,
        input: &UpdateImage,
    ) -> Result<Image, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let (mut image, dataset, project) = self.load_image_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Image {
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;

        input.apply(&mut image);
        if !self.store.update_image(&image).await? {
            return Err(CoreError::not_found("Image", id));
        }
        self.refresh_aggregates(&dataset.id).await?;
        Ok(image)
    }

    /// Delete an image and its annotations, then recount the dataset.
    pub async fn delete_image(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), CoreError> {
        let identity = require_identity(identity)?;
        let (image, dataset, project) = self.load_image_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Image {
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;

        if !self.store.delete_image(id).await? {
            return Err(CoreError::not_found("Image", id));
        }
        self.refresh_aggregates(&dataset.id).await?;

        tracing::info!(image_id = %id, dataset_id = %dataset.id, "Image deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::entities::{CreateDataset, CreateProject};
    use crate::gateway::test_support::{gateway, identity};

    async fn dataset_for(gw: &Gateway, owner: &Identity) -> String {
        let project = gw
            .create_project(
                Some(owner),
                &CreateProject {
                    name: "P".into(),
                    description: None,
                    status: None,
                },
            )
            .await
            .unwrap();
        gw.create_dataset(
            Some(owner),
            &project.id,
            &CreateDataset {
                name: "D".into(),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    fn image_at(uri: &str) -> CreateImage {
        CreateImage {
            uri: uri.into(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_adding_and_removing_images_recounts_total() {
        let (gw, _) = gateway();
        let u1 = identity("u1");
        let dataset_id = dataset_for(&gw, &u1).await;

        let first = gw
            .create_image(Some(&u1), &dataset_id, &image_at("/img/1.png"))
            .await
            .unwrap();
        gw.create_image(Some(&u1), &dataset_id, &image_at("s3://bucket/2.png"))
            .await
            .unwrap();
        assert_eq!(first.metadata, json!({}));
        assert_eq!(
            gw.get_dataset(Some(&u1), &dataset_id)
                .await
                .unwrap()
                .total_images,
            2
        );

        gw.delete_image(Some(&u1), &first.id).await.unwrap();
        let dataset = gw.get_dataset(Some(&u1), &dataset_id).await.unwrap();
        assert_eq!(dataset.total_images, 1);
        assert_eq!(gw.list_images(Some(&u1), &dataset_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_images_are_scoped_to_the_project_owner() {
        let (gw, _) = gateway();
        let owner = identity("owner");
        let other = identity("other");
        let dataset_id = dataset_for(&gw, &owner).await;
        let image = gw
            .create_image(Some(&owner), &dataset_id, &image_at("/img/a.png"))
            .await
            .unwrap();

        assert_matches!(
            gw.get_image(Some(&other), &image.id).await,
            Err(CoreError::NotFound { entity: "Image", .. })
        );
        assert_matches!(
            gw.create_image(Some(&other), &dataset_id, &image_at("/img/b.png"))
                .await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            gw.update_image(Some(&other), &image.id, &UpdateImage::default())
                .await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            gw.list_images(Some(&other), &dataset_id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_update_replaces_uri_and_metadata() {
        let (gw, _) = gateway();
        let u1 = identity("u1");
        let dataset_id = dataset_for(&gw, &u1).await;
        let image = gw
            .create_image(Some(&u1), &dataset_id, &image_at("/img/a.png"))
            .await
            .unwrap();

        let patch = UpdateImage {
            uri: Some("/img/b.png".into()),
            metadata: Some(json!({"width": 640, "height": 480})),
        };
        let updated = gw.update_image(Some(&u1), &image.id, &patch).await.unwrap();
        assert_eq!(updated.uri, "/img/b.png");
        assert_eq!(updated.metadata["width"], 640);

        let bad = UpdateImage {
            uri: Some("relative/path.png".into()),
            metadata: None,
        };
        assert_matches!(
            gw.update_image(Some(&u1), &image.id, &bad).await,
            Err(CoreError::Validation(_))
        );
    }
}
