//! Shared reqwest plumbing for the identity provider and the data client.

use labelhub_core::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;

/// Versioned API prefix appended to the configured base URL.
const API_PREFIX: &str = "/api/v1";

/// `{ "error", "code" }` body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// A non-2xx answer from the API.
#[derive(Debug)]
pub(crate) struct ApiFailure {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ApiFailure {
    /// Map the API's error code back onto the domain taxonomy.
    ///
    /// `NOT_FOUND` is left to callers, which know the entity and id.
    pub fn into_core_error(self) -> CoreError {
        match self.code.as_deref() {
            Some("VALIDATION_ERROR") | Some("BAD_REQUEST") => CoreError::Validation(self.message),
            Some("INVALID_CREDENTIALS") => CoreError::InvalidCredentials,
            Some("CONFLICT") => CoreError::Conflict(self.message),
            Some("UNAUTHORIZED") => CoreError::Unauthorized(self.message),
            Some("FORBIDDEN") => CoreError::Forbidden(self.message),
            Some("CANCELLED") => CoreError::Cancelled(self.message),
            Some("STORAGE_ERROR") => CoreError::Storage(self.message),
            _ => CoreError::Provider(format!("API error ({}): {}", self.status, self.message)),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, &config.api_url))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}{API_PREFIX}", api_url.trim_end_matches('/')),
        }
    }

    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and classify: transport errors become `Provider`, non-2xx become
    /// [`ApiFailure`].
    pub async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Result<reqwest::Response, ApiFailure>, CoreError> {
        let response = builder.send().await.map_err(transport_error)?;
        Ok(Self::ensure_success(response).await)
    }

    /// Parse a successful JSON response body into the expected type.
    pub async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::Provider(format!("Unexpected response body: {e}")))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (Some(parsed.code), parsed.error),
            Err(_) => (None, body),
        };
        Err(ApiFailure {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

fn transport_error(err: reqwest::Error) -> CoreError {
    tracing::warn!(error = %err, "API request failed");
    CoreError::Provider(format!("HTTP request failed: {err}"))
}
