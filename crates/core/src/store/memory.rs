//! Process-local [`Store`] / [`AccountStore`] backed by ordered maps.
//!
//! A single mutex guards all tables, so every call (including the aggregate
//! recompute) is serialized. Locks are never held across an `.await`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Account, AccountStore, RefreshSession, Store};
use crate::entities::{Annotation, Dataset, Image, Project};
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

#[derive(Default)]
struct Tables {
    projects: BTreeMap<EntityId, Project>,
    datasets: BTreeMap<EntityId, Dataset>,
    images: BTreeMap<EntityId, Image>,
    annotations: BTreeMap<EntityId, Annotation>,
    accounts: BTreeMap<EntityId, Account>,
    sessions: BTreeMap<EntityId, RefreshSession>,
}

impl Tables {
    fn remove_image_cascade(&mut self, image_id: &str) -> bool {
        let removed = self.images.remove(image_id).is_some();
        if removed {
            self.annotations.retain(|_, a| a.image_id != image_id);
        }
        removed
    }

    fn remove_dataset_cascade(&mut self, dataset_id: &str) -> bool {
        let removed = self.datasets.remove(dataset_id).is_some();
        if removed {
            let image_ids: Vec<EntityId> = self
                .images
                .values()
                .filter(|i| i.dataset_id == dataset_id)
                .map(|i| i.id.clone())
                .collect();
            for id in image_ids {
                self.remove_image_cascade(&id);
            }
        }
        removed
    }

    fn remove_project_cascade(&mut self, project_id: &str) -> bool {
        let removed = self.projects.remove(project_id).is_some();
        if removed {
            let dataset_ids: Vec<EntityId> = self
                .datasets
                .values()
                .filter(|d| d.project_id == project_id)
                .map(|d| d.id.clone())
                .collect();
            for id in dataset_ids {
                self.remove_dataset_cascade(&id);
            }
        }
        removed
    }
}

/// In-memory storage for tests, local development and embedding.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, CoreError> {
        self.tables
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".to_string()))
    }
}

fn require_parent(exists: bool, entity: &'static str, id: &str) -> Result<(), CoreError> {
    if exists {
        Ok(())
    } else {
        Err(CoreError::not_found(entity, id))
    }
}

fn require_unique(exists: bool, entity: &str, id: &str) -> Result<(), CoreError> {
    if exists {
        Err(CoreError::Conflict(format!("{entity} with id {id} already exists")))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        self.lock().map(|_| ())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), CoreError> {
        let mut t = self.lock()?;
        require_unique(t.projects.contains_key(&project.id), "Project", &project.id)?;
        t.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: &str) -> Result<Option<Project>, CoreError> {
        Ok(self.lock()?.projects.get(id).cloned())
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, CoreError> {
        let mut projects: Vec<Project> = self
            .lock()?
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<bool, CoreError> {
        let mut t = self.lock()?;
        match t.projects.get_mut(&project.id) {
            Some(row) => {
                row.name = project.name.clone();
                row.description = project.description.clone();
                row.status = project.status;
                row.updated_at = project.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_project(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.lock()?.remove_project_cascade(id))
    }

    async fn insert_dataset(&self, dataset: &Dataset) -> Result<(), CoreError> {
        let mut t = self.lock()?;
        require_parent(
            t.projects.contains_key(&dataset.project_id),
            "Project",
            &dataset.project_id,
        )?;
        require_unique(t.datasets.contains_key(&dataset.id), "Dataset", &dataset.id)?;
        t.datasets.insert(dataset.id.clone(), dataset.clone());
        Ok(())
    }

    async fn find_dataset(&self, id: &str) -> Result<Option<Dataset>, CoreError> {
        Ok(self.lock()?.datasets.get(id).cloned())
    }

    async fn list_datasets_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<Dataset>, CoreError> {
        Ok(self
            .lock()?
            .datasets
            .values()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_dataset(&self, dataset: &Dataset) -> Result<bool, CoreError> {
        let mut t = self.lock()?;
        match t.datasets.get_mut(&dataset.id) {
            Some(row) => {
                row.name = dataset.name.clone();
                row.description = dataset.description.clone();
                row.updated_at = dataset.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_dataset(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.lock()?.remove_dataset_cascade(id))
    }

    async fn insert_image(&self, image: &Image) -> Result<(), CoreError> {
        let mut t = self.lock()?;
        require_parent(
            t.datasets.contains_key(&image.dataset_id),
            "Dataset",
            &image.dataset_id,
        )?;
        require_unique(t.images.contains_key(&image.id), "Image", &image.id)?;
        t.images.insert(image.id.clone(), image.clone());
        Ok(())
    }

    async fn find_image(&self, id: &str) -> Result<Option<Image>, CoreError> {
        Ok(self.lock()?.images.get(id).cloned())
    }

    async fn list_images_by_dataset(&self, dataset_id: &str) -> Result<Vec<Image>, CoreError> {
        Ok(self
            .lock()?
            .images
            .values()
            .filter(|i| i.dataset_id == dataset_id)
            .cloned()
            .collect())
    }

    async fn update_image(&self, image: &Image) -> Result<bool, CoreError> {
        let mut t = self.lock()?;
        match t.images.get_mut(&image.id) {
            Some(row) => {
                row.uri = image.uri.clone();
                row.metadata = image.metadata.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_image(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.lock()?.remove_image_cascade(id))
    }

    async fn insert_annotation(&self, annotation: &Annotation) -> Result<(), CoreError> {
        let mut t = self.lock()?;
        require_parent(
            t.images.contains_key(&annotation.image_id),
            "Image",
            &annotation.image_id,
        )?;
        require_unique(
            t.annotations.contains_key(&annotation.id),
            "Annotation",
            &annotation.id,
        )?;
        t.annotations
            .insert(annotation.id.clone(), annotation.clone());
        Ok(())
    }

    async fn find_annotation(&self, id: &str) -> Result<Option<Annotation>, CoreError> {
        Ok(self.lock()?.annotations.get(id).cloned())
    }

    async fn list_annotations_by_image(
        &self,
        image_id: &str,
    ) -> Result<Vec<Annotation>, CoreError> {
        Ok(self
            .lock()?
            .annotations
            .values()
            .filter(|a| a.image_id == image_id)
            .cloned()
            .collect())
    }

    async fn update_annotation(&self, annotation: &Annotation) -> Result<bool, CoreError> {
        let mut t = self.lock()?;
        match t.annotations.get_mut(&annotation.id) {
            Some(row) => {
                row.payload = annotation.payload.clone();
                row.updated_at = annotation.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_annotation(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.lock()?.annotations.remove(id).is_some())
    }

    async fn recompute_dataset_counts(
        &self,
        dataset_id: &str,
    ) -> Result<Option<Dataset>, CoreError> {
        let mut t = self.lock()?;
        if !t.datasets.contains_key(dataset_id) {
            return Ok(None);
        }

        let image_ids: Vec<&EntityId> = t
            .images
            .values()
            .filter(|i| i.dataset_id == dataset_id)
            .map(|i| &i.id)
            .collect();
        let total = image_ids.len() as i64;
        let annotated = image_ids
            .iter()
            .filter(|id| {
                t.annotations
                    .values()
                    .any(|a| a.image_id.as_str() == id.as_str())
            })
            .count() as i64;

        let dataset = t
            .datasets
            .get_mut(dataset_id)
            .ok_or_else(|| CoreError::not_found("Dataset", dataset_id))?;
        dataset.total_images = total;
        dataset.annotated_count = annotated;
        Ok(Some(dataset.clone()))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &Account) -> Result<(), CoreError> {
        let mut t = self.lock()?;
        if t.accounts.values().any(|a| a.email == account.email) {
            return Err(CoreError::Conflict(format!(
                "An account with email {} already exists",
                account.email
            )));
        }
        t.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_account(&self, id: &str) -> Result<Option<Account>, CoreError> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, CoreError> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn insert_session(&self, session: &RefreshSession) -> Result<(), CoreError> {
        self.lock()?
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_active_session(
        &self,
        refresh_token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<RefreshSession>, CoreError> {
        Ok(self
            .lock()?
            .sessions
            .values()
            .find(|s| {
                s.refresh_token_hash == refresh_token_hash && !s.is_revoked && s.expires_at > now
            })
            .cloned())
    }

    async fn is_session_active(&self, id: &str, now: Timestamp) -> Result<bool, CoreError> {
        Ok(self
            .lock()?
            .sessions
            .get(id)
            .is_some_and(|s| !s.is_revoked && s.expires_at > now))
    }

    async fn revoke_session(&self, id: &str) -> Result<bool, CoreError> {
        let mut t = self.lock()?;
        match t.sessions.get_mut(id) {
            Some(s) if !s.is_revoked => {
                s.is_revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_sessions_for_user(&self, user_id: &str) -> Result<u64, CoreError> {
        let mut t = self.lock()?;
        let mut revoked = 0;
        for s in t.sessions.values_mut() {
            if s.user_id == user_id && !s.is_revoked {
                s.is_revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
