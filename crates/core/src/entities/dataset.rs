//! Dataset entity and DTOs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{validate_description, validate_name};

/// A named collection of images inside a project.
///
/// `total_images` and `annotated_count` are derived aggregates. They are
/// written only by the storage layer's recompute step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub total_images: i64,
    pub annotated_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new dataset. The parent project comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDataset {
    pub name: String,
    pub description: Option<String>,
}

impl CreateDataset {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("name", &self.name)?;
        validate_description(self.description.as_deref())
    }
}

/// DTO for updating an existing dataset. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDataset {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateDataset {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        validate_description(self.description.as_deref())
    }

    pub fn apply(&self, dataset: &mut Dataset) {
        if let Some(name) = &self.name {
            dataset.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            dataset.description = Some(description.clone());
        }
    }
}
