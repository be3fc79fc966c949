//! Authenticated identities and the identity provider boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// An authenticated user's session identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: EntityId,
    pub email: String,
    pub display_name: Option<String>,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Identity {
    /// Whether the identity's token has expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now())
    }
}

/// An identity together with the bearer tokens that prove it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub identity: Identity,
    pub access_token: String,
    /// Opaque token exchangeable for a fresh session, when the provider issues one.
    pub refresh_token: Option<String>,
}

/// The external identity service.
///
/// Implementations talk to a remote provider; this crate does not assume a
/// wire format. Errors are normalized into [`CoreError`]:
/// `Validation`, `Conflict`, `InvalidCredentials` or `Provider`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account and open a session for it.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthSession, CoreError>;

    /// Open a session with email + password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CoreError>;

    /// Exchange a refresh token for a new session (tokens rotate).
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, CoreError>;

    /// Look up the session behind an access token. `None` if it is no longer valid.
    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>, CoreError>;

    /// Revoke the sessions behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), CoreError>;
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn test_expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let identity = Identity {
            id: "u1".into(),
            email: "u1@example.com".into(),
            display_name: None,
            issued_at: now - Duration::minutes(5),
            expires_at: now,
        };
        assert!(identity.is_expired_at(now));
        assert!(!identity.is_expired_at(now - Duration::seconds(1)));
    }
}
