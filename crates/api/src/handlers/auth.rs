//! Handlers for the `/auth` resource (sign-up, sign-in, refresh, sign-out).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use labelhub_core::error::CoreError;
use labelhub_core::identity::{AuthSession, IdentityProvider};
use labelhub_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Session payload returned by every `/auth` endpoint that opens or
/// inspects a session.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Absent when inspecting an existing session.
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: EntityId,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        let identity = session.identity;
        let expires_in = (identity.expires_at - chrono::Utc::now()).num_seconds().max(0);
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in,
            issued_at: identity.issued_at,
            expires_at: identity.expires_at,
            user: UserInfo {
                id: identity.id,
                email: identity.email,
                display_name: identity.display_name,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register an account and open a session for it.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let session = state
        .identity
        .sign_up(
            &input.email,
            &input.password,
            input.display_name.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /api/v1/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<SignInRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = state.identity.sign_in(&input.email, &input.password).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = state
        .identity
        .refresh(&input.refresh_token)
        .await
        .map_err(|err| match err {
            CoreError::InvalidCredentials => AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            )),
            other => AppError::Core(other),
        })?;
    Ok(Json(session.into()))
}

/// POST /api/v1/auth/signout
///
/// Close every session of the caller. Access tokens issued to those sessions
/// stop working immediately. Returns 204 No Content.
pub async fn sign_out(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.identity.revoke_all(&user.identity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// Describe the session behind the presented access token.
pub async fn session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AuthResponse>> {
    let session = state
        .identity
        .get_session(&user.access_token)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Session is no longer valid".into()))?;
    Ok(Json(session.into()))
}
