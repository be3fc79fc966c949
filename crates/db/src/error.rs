//! Translation of sqlx failures into [`CoreError`].

use labelhub_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classify a sqlx error.
///
/// - Unique violations on a constraint named `uq_*` (or a primary key) map to
///   `Conflict`.
/// - Foreign key violations map to `Conflict`: the parent vanished between
///   the gateway's lookup and the insert.
/// - Everything else is a `Storage` error with a sanitized message.
pub fn into_core_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION)
                if constraint.starts_with("uq_") || constraint.ends_with("_pkey") =>
            {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return CoreError::Conflict(format!(
                    "Referenced row no longer exists: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage("Storage backend error".to_string())
}
