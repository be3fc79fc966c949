//! Annotation entity and DTOs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::validate_json_object;

/// A label attached to an image. The payload shape belongs to the drawing
/// tool and is stored opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: EntityId,
    pub image_id: EntityId,
    /// The identity that created the annotation. Never taken from input.
    pub author_id: EntityId,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnotation {
    pub payload: serde_json::Value,
}

impl CreateAnnotation {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_json_object("payload", &self.payload)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAnnotation {
    pub payload: serde_json::Value,
}

impl UpdateAnnotation {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_json_object("payload", &self.payload)
    }
}
