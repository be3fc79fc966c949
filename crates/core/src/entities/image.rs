//! Image entity and DTOs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{validate_json_object, validate_uri};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    pub dataset_id: EntityId,
    pub uri: String,
    /// Free-form JSON object (dimensions, capture info, ...).
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for registering an image in a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImage {
    pub uri: String,
    /// Defaults to `{}` if omitted.
    pub metadata: Option<serde_json::Value>,
}

impl CreateImage {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_uri(&self.uri)?;
        if let Some(metadata) = &self.metadata {
            validate_json_object("metadata", metadata)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateImage {
    pub uri: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl UpdateImage {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(uri) = &self.uri {
            validate_uri(uri)?;
        }
        if let Some(metadata) = &self.metadata {
            validate_json_object("metadata", metadata)?;
        }
        Ok(())
    }

    pub fn apply(&self, image: &mut Image) {
        if let Some(uri) = &self.uri {
            image.uri = uri.clone();
        }
        if let Some(metadata) = &self.metadata {
            image.metadata = metadata.clone();
        }
    }
}
