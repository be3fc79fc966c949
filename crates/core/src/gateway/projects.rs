use chrono::Utc;

use super::{active, ensure_readable, ensure_writable, require_identity, Gateway};
use crate::access::{self, Resource};
use crate::entities::{CreateProject, Project, ProjectOverview, UpdateProject};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::types::new_id;

/// Most recent first; ties broken by id ascending so listings are stable.
fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl Gateway {
    /// Projects owned by `identity`, most recent first.
    ///
    /// An absent or expired identity sees an empty list.
    pub async fn list_projects(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<Project>, CoreError> {
        let Some(identity) = active(identity) else {
            return Ok(Vec::new());
        };
        let mut projects = self.store.list_projects_by_owner(&identity.id).await?;
        projects.retain(|p| access::can_read(Some(identity), &Resource::Project(p)));
        sort_newest_first(&mut projects);
        Ok(projects)
    }

    /// Fetch one project. Missing and not-yours are both `NotFound`.
    pub async fn get_project(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<Project, CoreError> {
        let identity = active(identity).ok_or_else(|| CoreError::not_found("Project", id))?;
        let project = self.load_project(id).await?;
        ensure_readable(identity, &Resource::Project(&project))?;
        Ok(project)
    }

    /// Create a project owned by `identity`.
    pub async fn create_project(
        &self,
        identity: Option<&Identity>,
        input: &CreateProject,
    ) -> Result<Project, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let now = Utc::now();
        let project = Project {
            id: new_id(),
            owner_id: identity.id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_project(&project).await?;

        tracing::info!(project_id = %project.id, owner_id = %project.owner_id, "Project created");
        Ok(project)
    }

    pub async fn update_project(
        &self,
        identity: Option<&Identity>,
        id: &str,
        input: &UpdateProject,
    ) -> Result<Project, CoreError> {
        let identity = require_identity(identity)?;
        input.validate()?;

        let mut project = self.load_project(id).await?;
        ensure_writable(identity, &Resource::Project(&project))?;

        input.apply(&mut project);
        project.updated_at = Utc::now();
        if !self.store.update_project(&project).await? {
            return Err(CoreError::not_found("Project", id));
        }
        Ok(project)
    }

    /// Delete a project and, by cascade, everything beneath it.
    pub async fn delete_project(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<(), CoreError> {
        let identity = require_identity(identity)?;
        let project = self.load_project(id).await?;
        ensure_writable(identity, &Resource::Project(&project))?;

        if !self.store.delete_project(id).await? {
            return Err(CoreError::not_found("Project", id));
        }
        tracing::info!(project_id = %id, user_id = %identity.id, "Project deleted");
        Ok(())
    }

    /// A project with its datasets and summed image counts.
    pub async fn project_overview(
        &self,
        identity: Option<&Identity>,
        id: &str,
    ) -> Result<ProjectOverview, CoreError> {
        let project = self.get_project(identity, id).await?;
        let datasets = self.list_datasets(identity, &project.id).await?;
        Ok(ProjectOverview::new(project, datasets))
    }
}
