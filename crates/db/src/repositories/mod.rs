//! One repository per table. Each is a zero-sized struct whose associated
//! functions take the pool (or an open connection) as their first argument.

pub mod account_repo;
pub mod annotation_repo;
pub mod dataset_repo;
pub mod image_repo;
pub mod project_repo;
pub mod session_repo;

pub use account_repo::AccountRepo;
pub use annotation_repo::AnnotationRepo;
pub use dataset_repo::DatasetRepo;
pub use image_repo::ImageRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
