//! Project entity and DTOs.

use serde::{Deserialize, Serialize};

use crate::entities::dataset::Dataset;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{validate_description, validate_name};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    /// Return the status as a lowercase string slice (the stored form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(CoreError::Validation(format!(
                "Invalid project status '{s}'. Must be one of: active, archived"
            ))),
        }
    }
}

/// Root of the ownership tree. Only `owner_id` may read or change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub owner_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. The owner is the acting identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to [`ProjectStatus::Active`] if omitted.
    pub status: Option<ProjectStatus>,
}

impl CreateProject {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("name", &self.name)?;
        validate_description(self.description.as_deref())
    }
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl UpdateProject {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_description(self.description.as_deref())
    }

    /// Apply the non-`None` fields onto `project`.
    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            project.status = status;
        }
    }
}

/// A project together with its datasets and summed aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectOverview {
    pub project: Project,
    pub datasets: Vec<Dataset>,
    pub dataset_count: usize,
    pub total_images: i64,
    pub annotated_count: i64,
}

impl ProjectOverview {
    pub fn new(project: Project, datasets: Vec<Dataset>) -> Self {
        let total_images = datasets.iter().map(|d| d.total_images).sum();
        let annotated_count = datasets.iter().map(|d| d.annotated_count).sum();
        Self {
            dataset_count: datasets.len(),
            project,
            datasets,
            total_images,
            annotated_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_stored_form() {
        for status in [ProjectStatus::Active, ProjectStatus::Archived] {
            assert_eq!(ProjectStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ProjectStatus::parse("deleted").is_err());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let now = chrono::Utc::now();
        let mut project = Project {
            id: "p1".into(),
            owner_id: "u1".into(),
            name: "Original".into(),
            description: Some("keep me".into()),
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let patch = UpdateProject {
            name: Some("  Renamed ".into()),
            ..Default::default()
        };
        patch.apply(&mut project);
        assert_eq!(project.name, "Renamed");
        assert_eq!(project.description.as_deref(), Some("keep me"));
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn test_create_requires_a_name() {
        let input = CreateProject {
            name: "".into(),
            description: None,
            status: None,
        };
        assert!(input.validate().is_err());
    }
}
