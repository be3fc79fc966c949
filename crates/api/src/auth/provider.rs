//! [`LocalIdentityProvider`]: accounts, password checks and token issuance
//! on top of an [`AccountStore`].
//!
//! Sessions are a short-lived JWT access token plus an opaque refresh token.
//! Every access token names the refresh session it was issued with and is
//! only honoured while that session is active. Refresh tokens rotate on every
//! use; sign-out revokes every refresh session of the account, which also
//! invalidates every access token already handed out.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use labelhub_core::error::CoreError;
use labelhub_core::identity::{AuthSession, Identity, IdentityProvider};
use labelhub_core::store::{Account, AccountStore, RefreshSession};
use labelhub_core::types::new_id;
use uuid::Uuid;
use labelhub_core::validation::{
    normalize_email, validate_display_name, validate_email, validate_password,
};

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, validate_token, JwtConfig,
};
use crate::auth::password::{hash_password, verify_password};

/// Identity provider served by this API.
pub struct LocalIdentityProvider {
    accounts: Arc<dyn AccountStore>,
    jwt: JwtConfig,
    min_password_length: usize,
    /// Hash of an unguessable password, verified against when the email is
    /// unknown so both rejection paths cost one argon2 run.
    dummy_hash: Option<String>,
}

impl LocalIdentityProvider {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt: JwtConfig, min_password_length: usize) -> Self {
        let dummy_hash = hash_password(&Uuid::new_v4().to_string())
            .inspect_err(|e| tracing::warn!(error = %e, "Could not prepare dummy password hash"))
            .ok();
        Self {
            accounts,
            jwt,
            min_password_length,
            dummy_hash,
        }
    }

    /// Resolve an access token into the identity it proves.
    ///
    /// Fails with `Unauthorized` if the signature or expiry is bad, or if the
    /// refresh session the token was issued with has been revoked.
    pub async fn authenticate(&self, access_token: &str) -> Result<Identity, CoreError> {
        let rejected = || CoreError::Unauthorized("Invalid or expired token".into());
        let claims = validate_token(access_token, &self.jwt).map_err(|_| rejected())?;
        let identity = claims.identity().ok_or_else(rejected)?;
        if !self
            .accounts
            .is_session_active(&claims.sid, Utc::now())
            .await?
        {
            tracing::debug!(user_id = %identity.id, "Token belongs to a closed session");
            return Err(rejected());
        }
        Ok(identity)
    }

    /// Revoke every refresh session of `user_id`.
    pub async fn revoke_all(&self, user_id: &str) -> Result<u64, CoreError> {
        let revoked = self.accounts.revoke_sessions_for_user(user_id).await?;
        tracing::info!(user_id, revoked, "Sessions revoked");
        Ok(revoked)
    }

    /// Issue an access token and a fresh refresh session for `account`.
    async fn open_session(&self, account: &Account) -> Result<AuthSession, CoreError> {
        let session_id = new_id();
        let (access_token, claims) = generate_access_token(
            &account.id,
            &account.email,
            account.display_name.as_deref(),
            &session_id,
            &self.jwt,
        )
        .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))?;
        let identity = claims
            .identity()
            .ok_or_else(|| CoreError::Internal("Token timestamps out of range".into()))?;

        let (refresh_plaintext, refresh_hash) = generate_refresh_token();
        let now = Utc::now();
        self.accounts
            .insert_session(&RefreshSession {
                id: session_id,
                user_id: account.id.clone(),
                refresh_token_hash: refresh_hash,
                expires_at: now + Duration::days(self.jwt.refresh_token_expiry_days),
                is_revoked: false,
                created_at: now,
            })
            .await?;

        Ok(AuthSession {
            identity,
            access_token,
            refresh_token: Some(refresh_plaintext),
        })
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthSession, CoreError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password, self.min_password_length)?;
        let display_name = Some(display_name.trim()).filter(|name| !name.is_empty());
        validate_display_name(display_name)?;

        if self.accounts.find_account_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(
                "An account with this email already exists".into(),
            ));
        }

        let password_hash = hash_password(password)
            .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
        let account = Account {
            id: new_id(),
            email,
            display_name: display_name.map(str::to_string),
            password_hash,
            created_at: Utc::now(),
        };
        self.accounts.insert_account(&account).await?;
        tracing::info!(user_id = %account.id, "Account registered");

        self.open_session(&account).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CoreError> {
        let email = normalize_email(email);
        let Some(account) = self.accounts.find_account_by_email(&email).await? else {
            if let Some(dummy) = &self.dummy_hash {
                let _ = verify_password(password, dummy);
            }
            return Err(CoreError::InvalidCredentials);
        };

        let valid = verify_password(password, &account.password_hash)
            .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?;
        if !valid {
            tracing::info!(user_id = %account.id, "Sign-in rejected");
            return Err(CoreError::InvalidCredentials);
        }

        tracing::info!(user_id = %account.id, "Signed in");
        self.open_session(&account).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, CoreError> {
        let hash = hash_refresh_token(refresh_token);
        let session = self
            .accounts
            .find_active_session(&hash, Utc::now())
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        // Rotation: a refresh token is good for exactly one exchange.
        if !self.accounts.revoke_session(&session.id).await? {
            return Err(CoreError::InvalidCredentials);
        }

        let account = self
            .accounts
            .find_account(&session.user_id)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;
        self.open_session(&account).await
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<AuthSession>, CoreError> {
        let identity = match self.authenticate(access_token).await {
            Ok(identity) => identity,
            Err(CoreError::Unauthorized(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if self.accounts.find_account(&identity.id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(AuthSession {
            identity,
            access_token: access_token.to_string(),
            refresh_token: None,
        }))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), CoreError> {
        let identity = self.authenticate(access_token).await?;
        self.revoke_all(&identity.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use labelhub_core::store::MemoryStore;

    use super::*;

    fn provider() -> LocalIdentityProvider {
        let jwt = JwtConfig {
            secret: "provider-test-secret".into(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        };
        LocalIdentityProvider::new(Arc::new(MemoryStore::new()), jwt, 8)
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let p = provider();
        let created = p
            .sign_up("  Ada@Example.com ", "long-enough", "Ada")
            .await
            .unwrap();
        assert_eq!(created.identity.email, "ada@example.com");
        assert_eq!(created.identity.display_name.as_deref(), Some("Ada"));
        assert!(created.refresh_token.is_some());

        let session = p.sign_in("ada@example.com", "long-enough").await.unwrap();
        assert_eq!(session.identity.id, created.identity.id);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_bad_input_and_duplicates() {
        let p = provider();
        assert_matches!(
            p.sign_up("not-an-email", "long-enough", "").await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            p.sign_up("a@example.com", "short", "").await,
            Err(CoreError::Validation(_))
        );

        p.sign_up("a@example.com", "long-enough", "").await.unwrap();
        assert_matches!(
            p.sign_up("A@example.com", "long-enough", "").await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let p = provider();
        p.sign_up("a@example.com", "long-enough", "").await.unwrap();
        assert_matches!(
            p.sign_in("a@example.com", "wrong-password").await,
            Err(CoreError::InvalidCredentials)
        );
        assert_matches!(
            p.sign_in("nobody@example.com", "long-enough").await,
            Err(CoreError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unknown_email_path_has_a_hash_to_verify() {
        let p = provider();
        let dummy = p.dummy_hash.as_deref().expect("dummy hash prepared");
        assert!(dummy.starts_with("$argon2id$"));
        assert!(!verify_password("long-enough", dummy).unwrap());
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_token() {
        let p = provider();
        let session = p.sign_up("a@example.com", "long-enough", "").await.unwrap();
        let first = session.refresh_token.unwrap();

        let rotated = p.refresh(&first).await.unwrap();
        assert_eq!(rotated.identity.id, session.identity.id);
        assert_matches!(p.refresh(&first).await, Err(CoreError::InvalidCredentials));
        // The access token of the rotated-out session goes with it.
        assert!(p.get_session(&session.access_token).await.unwrap().is_none());
        assert!(p.get_session(&rotated.access_token).await.unwrap().is_some());
        assert!(p.refresh(rotated.refresh_token.as_deref().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_closes_every_session_of_the_account() {
        let p = provider();
        let session = p.sign_up("a@example.com", "long-enough", "").await.unwrap();
        let other = p.sign_in("a@example.com", "long-enough").await.unwrap();
        let refresh = session.refresh_token.clone().unwrap();

        assert!(p.get_session(&session.access_token).await.unwrap().is_some());
        p.sign_out(&session.access_token).await.unwrap();
        assert_matches!(p.refresh(&refresh).await, Err(CoreError::InvalidCredentials));

        // Access tokens die with their sessions, not at their `exp`.
        assert!(p.get_session(&session.access_token).await.unwrap().is_none());
        assert!(p.get_session(&other.access_token).await.unwrap().is_none());
        assert_matches!(
            p.authenticate(&other.access_token).await,
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            p.sign_out(&session.access_token).await,
            Err(CoreError::Unauthorized(_))
        );

        assert!(p.get_session("garbage").await.unwrap().is_none());
        assert_matches!(p.sign_out("garbage").await, Err(CoreError::Unauthorized(_)));
    }
}
