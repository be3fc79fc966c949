//! Hierarchical data gateway.
//!
//! The only writer of record for the Project → Dataset → Image → Annotation
//! tree. Every operation takes the caller's identity, loads the containment
//! chain from storage, consults [`access`] and only then reads or writes.
//!
//! Error policy, identical at every level of the tree:
//!
//! | Situation                                         | Error        |
//! |---------------------------------------------------|--------------|
//! | read: no identity, missing, or not readable       | `NotFound`   |
//! | write: no identity                                | `Forbidden`  |
//! | write: target/parent missing or not readable      | `NotFound`   |
//! | write: readable but not writable                  | `Forbidden`  |
//! | malformed input                                   | `Validation` |
//!
//! Identities whose token has expired are treated as absent.

mod annotations;
mod datasets;
mod images;
mod projects;

use std::sync::Arc;

use chrono::Utc;

use crate::access::{self, Resource};
use crate::entities::{Annotation, Dataset, Image, Project};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::store::Store;

/// Ownership-scoped CRUD over the project tree.
///
/// Cheap to clone; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn Store>,
}

impl Gateway {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The underlying store (for health checks).
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // Containment chain loading
    // -----------------------------------------------------------------------

    async fn load_project(&self, id: &str) -> Result<Project, CoreError> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))
    }

    async fn load_dataset_chain(&self, id: &str) -> Result<(Dataset, Project), CoreError> {
        let dataset = self
            .store
            .find_dataset(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Dataset", id))?;
        let project = self
            .store
            .find_project(&dataset.project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Dataset", id))?;
        Ok((dataset, project))
    }

    async fn load_image_chain(&self, id: &str) -> Result<(Image, Dataset, Project), CoreError> {
        let image = self
            .store
            .find_image(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Image", id))?;
        let (dataset, project) = self
            .load_dataset_chain(&image.dataset_id)
            .await
            .map_err(|e| rename_not_found(e, "Image", id))?;
        Ok((image, dataset, project))
    }

    async fn load_annotation_chain(
        &self,
        id: &str,
    ) -> Result<(Annotation, Image, Dataset, Project), CoreError> {
        let annotation = self
            .store
            .find_annotation(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Annotation", id))?;
        let (image, dataset, project) = self
            .load_image_chain(&annotation.image_id)
            .await
            .map_err(|e| rename_not_found(e, "Annotation", id))?;
        Ok((annotation, image, dataset, project))
    }

    /// Recount the parent dataset's aggregates after an image or annotation
    /// mutation.
    async fn refresh_aggregates(&self, dataset_id: &str) -> Result<(), CoreError> {
        match self.store.recompute_dataset_counts(dataset_id).await? {
            Some(dataset) => tracing::debug!(
                dataset_id,
                total_images = dataset.total_images,
                annotated_count = dataset.annotated_count,
                "Dataset aggregates recomputed"
            ),
            None => tracing::warn!(dataset_id, "Dataset vanished before aggregate recompute"),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Authorization helpers
// ---------------------------------------------------------------------------

/// Treat expired identities as absent.
fn active(identity: Option<&Identity>) -> Option<&Identity> {
    identity.filter(|i| !i.is_expired_at(Utc::now()))
}

/// Writes require a live identity before anything is looked up.
fn require_identity(identity: Option<&Identity>) -> Result<&Identity, CoreError> {
    active(identity).ok_or_else(|| CoreError::Forbidden("Authentication required".into()))
}

/// Reads of anything the identity cannot see look exactly like a missing row.
fn ensure_readable(identity: &Identity, resource: &Resource<'_>) -> Result<(), CoreError> {
    if access::can_read(Some(identity), resource) {
        Ok(())
    } else {
        Err(CoreError::not_found(resource.kind(), resource.id()))
    }
}

fn ensure_writable(identity: &Identity, resource: &Resource<'_>) -> Result<(), CoreError> {
    ensure_readable(identity, resource)?;
    if !access::can_write(Some(identity), resource) {
        return Err(CoreError::Forbidden(format!(
            "Not allowed to modify {} {}",
            resource.kind(),
            resource.id()
        )));
    }
    Ok(())
}

/// A missing ancestor is reported as the requested entity being missing.
fn rename_not_found(err: CoreError, entity: &'static str, id: &str) -> CoreError {
    match err {
        CoreError::NotFound { .. } => CoreError::not_found(entity, id),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::Gateway;
    use crate::identity::Identity;
    use crate::store::MemoryStore;

    pub fn identity(id: &str) -> Identity {
        let now = Utc::now();
        Identity {
            id: id.into(),
            email: format!("{id}@example.com"),
            display_name: None,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    pub fn expired_identity(id: &str) -> Identity {
        let now = Utc::now();
        Identity {
            issued_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
            ..identity(id)
        }
    }

    pub fn gateway() -> (Gateway, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Gateway::new(store.clone()), store)
    }
}
