//! Storage boundary.
//!
//! [`Store`] covers the four project-tree collections; [`AccountStore`]
//! covers the server-side account and refresh-session tables. Both are
//! record-oriented (filter by field, order, insert, atomic single-row update,
//! delete) so any relational or document store can implement them.
//!
//! Implementations:
//! - [`memory::MemoryStore`] -- process-local, used by tests and dev mode.
//! - `labelhub_db::PgStore` -- PostgreSQL via sqlx.
//!
//! Stores perform no authorization. Only the
//! [`Gateway`](crate::gateway::Gateway) writes the project tree, and it checks
//! access before every call.

pub mod memory;

use async_trait::async_trait;

use crate::entities::{Annotation, Dataset, Image, Project};
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

pub use memory::MemoryStore;

/// Record-level access to projects, datasets, images and annotations.
///
/// Deletes cascade down the tree. `update_*` methods are atomic single-row
/// updates that return `false` when the row no longer exists.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check.
    async fn health_check(&self) -> Result<(), CoreError>;

    // --- projects ---
    async fn insert_project(&self, project: &Project) -> Result<(), CoreError>;
    async fn find_project(&self, id: &str) -> Result<Option<Project>, CoreError>;
    /// Projects with `owner_id == owner_id`, most recent first.
    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, CoreError>;
    async fn update_project(&self, project: &Project) -> Result<bool, CoreError>;
    async fn delete_project(&self, id: &str) -> Result<bool, CoreError>;

    // --- datasets ---
    async fn insert_dataset(&self, dataset: &Dataset) -> Result<(), CoreError>;
    async fn find_dataset(&self, id: &str) -> Result<Option<Dataset>, CoreError>;
    async fn list_datasets_by_project(&self, project_id: &str)
        -> Result<Vec<Dataset>, CoreError>;
    /// Writes `name`, `description` and `updated_at` only. The aggregate
    /// columns belong to [`Store::recompute_dataset_counts`].
    async fn update_dataset(&self, dataset: &Dataset) -> Result<bool, CoreError>;
    async fn delete_dataset(&self, id: &str) -> Result<bool, CoreError>;

    // --- images ---
    async fn insert_image(&self, image: &Image) -> Result<(), CoreError>;
    async fn find_image(&self, id: &str) -> Result<Option<Image>, CoreError>;
    async fn list_images_by_dataset(&self, dataset_id: &str) -> Result<Vec<Image>, CoreError>;
    async fn update_image(&self, image: &Image) -> Result<bool, CoreError>;
    async fn delete_image(&self, id: &str) -> Result<bool, CoreError>;

    // --- annotations ---
    async fn insert_annotation(&self, annotation: &Annotation) -> Result<(), CoreError>;
    async fn find_annotation(&self, id: &str) -> Result<Option<Annotation>, CoreError>;
    async fn list_annotations_by_image(&self, image_id: &str)
        -> Result<Vec<Annotation>, CoreError>;
    async fn update_annotation(&self, annotation: &Annotation) -> Result<bool, CoreError>;
    async fn delete_annotation(&self, id: &str) -> Result<bool, CoreError>;

    // --- aggregates ---
    /// Recount `total_images` and `annotated_count` from the current child
    /// rows and store them. Must be serialized against concurrent recomputes
    /// of the same dataset. Returns `None` if the dataset no longer exists.
    async fn recompute_dataset_counts(&self, dataset_id: &str)
        -> Result<Option<Dataset>, CoreError>;
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A registered account. Contains the password hash -- never serialize it.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: EntityId,
    /// Normalized (trimmed, lowercase) email; unique.
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// A server-side refresh session. Only the SHA-256 of the token is stored.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub id: EntityId,
    pub user_id: EntityId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// Record-level access to accounts and refresh sessions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. Fails with `Conflict` if the email is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), CoreError>;
    async fn find_account(&self, id: &str) -> Result<Option<Account>, CoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, CoreError>;

    async fn insert_session(&self, session: &RefreshSession) -> Result<(), CoreError>;
    /// Find a session that is neither revoked nor expired at `now`.
    async fn find_active_session(
        &self,
        refresh_token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<RefreshSession>, CoreError>;
    /// Whether session `id` exists and is neither revoked nor expired at `now`.
    async fn is_session_active(&self, id: &str, now: Timestamp) -> Result<bool, CoreError>;
    /// Revoke one session. Returns `true` if it was active.
    async fn revoke_session(&self, id: &str) -> Result<bool, CoreError>;
    /// Revoke all active sessions of a user. Returns how many were revoked.
    async fn revoke_sessions_for_user(&self, user_id: &str) -> Result<u64, CoreError>;
}
