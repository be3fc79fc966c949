//! Domain error taxonomy shared by every layer.

/// Errors surfaced by the gateway, the auth service and storage backends.
///
/// `Provider` and `Storage` are transient infrastructure failures; everything
/// else is a final answer for the given input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An auth operation whose result was discarded because a newer
    /// operation (usually a sign-out) started after it.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a [`CoreError::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether the caller may retry the same request later (with backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_entity_and_id() {
        let err = CoreError::not_found("Project", "p1");
        assert_eq!(err.to_string(), "Entity not found: Project with id p1");
    }

    #[test]
    fn test_only_infrastructure_errors_are_retryable() {
        assert!(CoreError::Provider("timeout".into()).is_retryable());
        assert!(CoreError::Storage("pool closed".into()).is_retryable());
        assert!(!CoreError::InvalidCredentials.is_retryable());
        assert!(!CoreError::Forbidden("no".into()).is_retryable());
        assert!(!CoreError::not_found("Image", "i1").is_retryable());
    }
}
