//! Field validation helpers shared by DTOs and the auth service.
//!
//! Every helper returns `Err(CoreError::Validation(..))` with a message that
//! names the offending field, so callers can surface it verbatim.

use validator::ValidateEmail;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a project or dataset name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a free-text description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum length of an image URI.
pub const MAX_URI_LENGTH: usize = 2048;

/// Maximum length of a display name.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Minimum password length used when no policy is configured.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound on password length to keep hashing cost bounded.
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// Text fields
// ---------------------------------------------------------------------------

/// Validate a required, human-readable name.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional description.
pub fn validate_description(value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => Err(
            CoreError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )),
        ),
        _ => Ok(()),
    }
}

/// Validate an image location.
///
/// Accepts absolute paths (`/data/a.png`) and anything with a URI scheme
/// (`s3://bucket/a.png`, `https://...`). Whitespace is rejected.
pub fn validate_uri(uri: &str) -> Result<(), CoreError> {
    if uri.is_empty() {
        return Err(CoreError::Validation("uri must not be empty".to_string()));
    }
    if uri.len() > MAX_URI_LENGTH {
        return Err(CoreError::Validation(format!(
            "uri must be at most {MAX_URI_LENGTH} bytes"
        )));
    }
    if uri.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "uri must not contain whitespace".to_string(),
        ));
    }
    if !uri.starts_with('/') && !has_scheme(uri) {
        return Err(CoreError::Validation(format!(
            "uri '{uri}' must be an absolute path or include a scheme"
        )));
    }
    Ok(())
}

fn has_scheme(uri: &str) -> bool {
    match uri.split_once("://") {
        Some((scheme, rest)) => {
            !rest.is_empty()
                && scheme
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Validate that a JSON value is an object (annotation payloads, image metadata).
pub fn validate_json_object(field: &str, value: &serde_json::Value) -> Result<(), CoreError> {
    if !value.is_object() {
        return Err(CoreError::Validation(format!(
            "{field} must be a JSON object"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Lowercase and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !normalize_email(email).validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validate that a password meets the configured strength policy.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), CoreError> {
    let length = password.chars().count();
    if length < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Validate an optional display name.
pub fn validate_display_name(name: Option<&str>) -> Result<(), CoreError> {
    match name {
        Some(n) if n.chars().count() > MAX_DISPLAY_NAME_LENGTH => Err(CoreError::Validation(
            format!("display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_names_are_rejected() {
        assert_matches!(validate_name("name", "   "), Err(CoreError::Validation(_)));
        assert!(validate_name("name", "Street scenes").is_ok());
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_matches!(validate_name("name", &long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_description_limit() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("short")).is_ok());
        let long = "d".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_description(Some(&long)).is_err());
    }

    #[test]
    fn test_uri_accepts_paths_and_schemes() {
        assert!(validate_uri("/data/frames/0001.png").is_ok());
        assert!(validate_uri("s3://bucket/img.jpg").is_ok());
        assert!(validate_uri("https://cdn.example.com/a.webp").is_ok());
    }

    #[test]
    fn test_uri_rejects_relative_and_whitespace() {
        assert!(validate_uri("").is_err());
        assert!(validate_uri("images/a.png").is_err());
        assert!(validate_uri("/data/my image.png").is_err());
        assert!(validate_uri("://missing-scheme").is_err());
    }

    #[test]
    fn test_json_object_check() {
        assert!(validate_json_object("payload", &json!({"label": "car"})).is_ok());
        assert!(validate_json_object("payload", &json!([1, 2])).is_err());
        assert!(validate_json_object("payload", &json!(null)).is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ann@example.com").is_ok());
        assert!(validate_email("  Ann@Example.com ").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }

    #[test]
    fn test_password_policy() {
        let msg = validate_password("short", 8).unwrap_err().to_string();
        assert!(msg.contains("at least 8 characters"));
        assert!(validate_password("exactly8", 8).is_ok());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_LENGTH + 1), 8).is_err());
    }
}
