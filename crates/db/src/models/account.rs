//! Row model for the `accounts` table.

use labelhub_core::store::Account;
use labelhub_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

/// An account row. Contains the password hash -- never serialize it.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: EntityId,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
