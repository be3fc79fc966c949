use chrono::Utc;

use super::{active, ensure_readable, ensure_writable, require_identity, Gateway};
use crate::access::Resource;
use crate::entities::{Annotation, CreateAnnotation, UpdateAnnotation};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::types::new_id;

impl Gateway {
    /// Annotations on an image, oldest first.
    pub async fn list_annotations(
        &self,
        identity: Option<&Identity>,
        image_id: &str,
    ) -> Result<Vec<Annotation>, CoreError> {
        let image = self.get_image(identity, image_id).await?;
        let mut annotations = self.store.list_annotations_by_image(&image.id).await?;
        annotations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(annotations)
    }

    pub async fn get_annotation(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<Annotation, CoreError> {
        let identity =
            active(identity).ok_or_else(|| CoreError::not_found("Annotation", id))?;
        let (annotation, image, dataset, project) = self.load_annotation_chain(id).await?;
        ensure_readable(
            identity,
            &Resource::Annotation {
                annotation: &annotation,
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;
        Ok(annotation)
    }

    /// Annotate `image_id` as `identity`, then recount the parent dataset.
    ///
    /// The author is always the acting identity, which must hold write access
    /// to the image's project at this moment.
    pub async fn create_annotation(
        &self,
        identity: Option<&Identity>,
        image_id: &str,
        input: &CreateAnnotation,
    ) -> Result<Annotation, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let (image, dataset, project) = self.load_image_chain(image_id).await?;
        ensure_writable(
            identity,
            &Resource::Image {
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;

        let now = Utc::now();
        let annotation = Annotation {
            id: new_id(),
            image_id: image.id.clone(),
            author_id: identity.id.clone(),
            payload: input.payload.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_annotation(&annotation).await?;
        self.refresh_aggregates(&dataset.id).await?;

        tracing::info!(
            annotation_id = %annotation.id,
            image_id = %image.id,
            author_id = %annotation.author_id,
            "Annotation created"
        );
        Ok(annotation)
    }

    pub async fn update_annotation(
        &self,
        identity: Option<&Identity>,
        id: &str,
        input: &UpdateAnnotation,
    ) -> Result<Annotation, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let (mut annotation, image, dataset, project) = self.load_annotation_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Annotation {
                annotation: &annotation,
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;

        annotation.payload = input.payload.clone();
        annotation.updated_at = Utc::now();
        if !self.store.update_annotation(&annotation).await? {
            return Err(CoreError::not_found("Annotation", id));
        }
        self.refresh_aggregates(&dataset.id).await?;
        Ok(annotation)
    }

    pub async fn delete_annotation(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), CoreError> {
        let identity = require_identity(identity)?;
        let (annotation, image, dataset, project) = self.load_annotation_chain(id).await?;
        ensure_writable(
            identity,
            &Resource::Annotation {
                annotation: &annotation,
                image: &image,
                dataset: &dataset,
                project: &project,
            },
        )?;

        if !self.store.delete_annotation(id).await? {
            return Err(CoreError::not_found("Annotation", id));
        }
        self.refresh_aggregates(&dataset.id).await?;
        Ok(())
    }
}
