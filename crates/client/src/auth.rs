//! Auth service: sign-up, sign-in, sign-out and session refresh.
//!
//! Each operation that can establish a session takes a generation from the
//! [`SessionStore`] before contacting the provider and commits only if that
//! generation is still current. A sign-out that finishes while a sign-in is
//! in flight therefore wins, and the late sign-in returns
//! [`CoreError::Cancelled`] without touching the store.
//!
//! Refresh only observes the generation. It loses to any sign-in, sign-up or
//! sign-out that starts or lands before it finishes, and never cancels one.

use std::sync::Arc;

use labelhub_core::error::CoreError;
use labelhub_core::identity::{AuthSession, Identity, IdentityProvider};
use labelhub_core::validation::{
    normalize_email, validate_display_name, validate_email, validate_password,
};

use crate::session::{Generation, SessionState, SessionStore};

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    session: Arc<SessionStore>,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        session: Arc<SessionStore>,
        min_password_length: usize,
    ) -> Self {
        Self {
            provider,
            session,
            min_password_length,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Register and sign in.
    ///
    /// Input is checked locally before the provider is contacted, so a
    /// malformed email or short password never leaves the process.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, CoreError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password, self.min_password_length)?;
        let display_name = display_name.trim();
        validate_display_name(Some(display_name).filter(|n| !n.is_empty()))?;

        let generation = self.session.begin_operation();
        let session = self
            .provider
            .sign_up(&email, password, display_name)
            .await?;
        self.commit(generation, session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, CoreError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(CoreError::InvalidCredentials);
        }

        let generation = self.session.begin_operation();
        let session = self.provider.sign_in(&email, password).await?;
        self.commit(generation, session)
    }

    /// Sign out locally and, best effort, at the provider.
    ///
    /// The local session is always cleared, even when the provider cannot be
    /// reached. Calling this while signed out is a no-op.
    pub async fn sign_out(&self) {
        let held = match self.session.state() {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        };
        self.session.clear();

        let Some(session) = held else {
            return;
        };
        match self.provider.sign_out(&session.access_token).await {
            Ok(()) => tracing::info!(user_id = %session.identity.id, "Signed out"),
            Err(e) => tracing::warn!(
                user_id = %session.identity.id,
                error = %e,
                "Remote sign-out failed; local session cleared anyway"
            ),
        }
    }

    /// Re-validate the held session with the provider.
    ///
    /// Returns the refreshed identity, or `None` when the session is gone (in
    /// which case the store is cleared). When the access token is rejected
    /// and a refresh token is held, the tokens are rotated instead. Transient
    /// provider failures are returned and leave the session untouched.
    pub async fn refresh(&self) -> Result<Option<Identity>, CoreError> {
        let SessionState::SignedIn(held) = self.session.state() else {
            return Ok(None);
        };
        let generation = self.session.current_generation();

        match self.provider.get_session(&held.access_token).await {
            Ok(Some(mut fresh)) => {
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = held.refresh_token.clone();
                }
                return self.commit_refresh(generation, fresh).map(Some);
            }
            Ok(None) | Err(CoreError::InvalidCredentials | CoreError::Unauthorized(_)) => {}
            Err(e) => return Err(e),
        }

        let Some(refresh_token) = held.refresh_token.as_deref() else {
            return self.expire(generation, &held);
        };
        match self.provider.refresh(refresh_token).await {
            Ok(rotated) => self.commit_refresh(generation, rotated).map(Some),
            Err(CoreError::InvalidCredentials | CoreError::Unauthorized(_)) => {
                self.expire(generation, &held)
            }
            Err(e) => Err(e),
        }
    }

    fn commit(&self, generation: Generation, session: AuthSession) -> Result<Identity, CoreError> {
        let identity = session.identity.clone();
        if self.session.set_current_if(generation, session) {
            tracing::info!(user_id = %identity.id, "Session established");
            Ok(identity)
        } else {
            tracing::debug!(user_id = %identity.id, "Discarding superseded session");
            Err(CoreError::Cancelled(
                "A newer session change superseded this operation".into(),
            ))
        }
    }

    fn commit_refresh(
        &self,
        generation: Generation,
        session: AuthSession,
    ) -> Result<Identity, CoreError> {
        let identity = session.identity.clone();
        if self.session.refresh_if(generation, session) {
            tracing::debug!(user_id = %identity.id, "Session refreshed");
            Ok(identity)
        } else {
            tracing::debug!(user_id = %identity.id, "Discarding refresh overtaken by a session change");
            Err(CoreError::Cancelled(
                "The session changed while it was being refreshed".into(),
            ))
        }
    }

    fn expire(
        &self,
        generation: Generation,
        held: &AuthSession,
    ) -> Result<Option<Identity>, CoreError> {
        if self.session.clear_if(generation) {
            tracing::info!(user_id = %held.identity.id, "Session no longer valid; signed out");
        }
        Ok(None)
    }
}
