//! Entity records and DTOs for the project tree.
//!
//! Each submodule contains:
//! - The `Serialize` entity struct as stored and returned to callers
//! - A `Deserialize` create DTO
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! DTOs never carry owner or parent-owner fields: ownership is always derived
//! from the stored containment chain.

pub mod annotation;
pub mod dataset;
pub mod image;
pub mod project;

pub use annotation::{Annotation, CreateAnnotation, UpdateAnnotation};
pub use dataset::{CreateDataset, Dataset, UpdateDataset};
pub use image::{CreateImage, Image, UpdateImage};
pub use project::{CreateProject, Project, ProjectOverview, ProjectStatus, UpdateProject};
