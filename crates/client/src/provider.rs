//! [`IdentityProvider`] backed by the API server's `/auth` endpoints.

use async_trait::async_trait;
use labelhub_core::error::CoreError;
use labelhub_core::identity::{AuthSession, Identity, IdentityProvider};
use labelhub_core::types::{EntityId, Timestamp};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::http::ApiClient;

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Session payload of the `/auth` endpoints.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: Option<String>,
    issued_at: Timestamp,
    expires_at: Timestamp,
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: EntityId,
    email: String,
    display_name: Option<String>,
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            identity: Identity {
                id: response.user.id,
                email: response.user.email,
                display_name: response.user.display_name,
                issued_at: response.issued_at,
                expires_at: response.expires_at,
            },
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}

/// Talks to `<api_url>/api/v1/auth`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    api: ApiClient,
}

impl HttpIdentityProvider {
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    /// Create a provider reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            api: ApiClient::with_client(client, api_url),
        }
    }

    async fn open_session<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthSession, CoreError> {
        let request = self.api.request(Method::POST, path, None).json(body);
        let response = self
            .api
            .send(request)
            .await?
            .map_err(|failure| failure.into_core_error())?;
        let parsed: AuthResponse = ApiClient::parse(response).await?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthSession, CoreError> {
        let body = SignUpBody {
            email,
            password,
            display_name: Some(display_name).filter(|n| !n.is_empty()),
        };
        self.open_session("/auth/signup", &body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CoreError> {
        self.open_session("/auth/signin", &SignInBody { email, password })
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, CoreError> {
        self.open_session("/auth/refresh", &RefreshBody { refresh_token })
            .await
            .map_err(|err| match err {
                // A rejected refresh token is a credential failure, not a transport one.
                CoreError::Unauthorized(_) => CoreError::InvalidCredentials,
                other => other,
            })
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>, CoreError> {
        let request = self
            .api
            .request(Method::GET, "/auth/session", Some(access_token));
        match self.api.send(request).await? {
            Ok(response) => {
                let parsed: AuthResponse = ApiClient::parse(response).await?;
                Ok(Some(parsed.into()))
            }
            Err(failure) if failure.status == 401 => Ok(None),
            Err(failure) => Err(failure.into_core_error()),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), CoreError> {
        let request = self
            .api
            .request(Method::POST, "/auth/signout", Some(access_token));
        self.api
            .send(request)
            .await?
            .map_err(|failure| failure.into_core_error())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_becomes_a_session() {
        let json = serde_json::json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "issued_at": "2026-01-01T00:00:00Z",
            "expires_at": "2026-01-01T01:00:00Z",
            "user": { "id": "u1", "email": "u1@example.com", "display_name": null }
        });
        let session: AuthSession = serde_json::from_value::<AuthResponse>(json).unwrap().into();
        assert_eq!(session.identity.id, "u1");
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
        assert_eq!(
            (session.identity.expires_at - session.identity.issued_at).num_minutes(),
            60
        );
    }

    #[test]
    fn test_empty_display_name_is_not_sent() {
        let body = SignUpBody {
            email: "a@example.com",
            password: "pw",
            display_name: Some("").filter(|n| !n.is_empty()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("display_name").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_provider_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let provider = HttpIdentityProvider::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
        let err = provider.sign_in("a@example.com", "password").await.unwrap_err();
        assert!(err.is_retryable(), "expected a transient error, got {err:?}");
    }
}
