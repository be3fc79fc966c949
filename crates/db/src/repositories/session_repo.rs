//! Repository for the `refresh_sessions` table.

use labelhub_core::store::RefreshSession;
use labelhub_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, created_at";

/// Provides CRUD operations for refresh sessions.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, session: &RefreshSession) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_sessions
                (id, user_id, refresh_token_hash, expires_at, is_revoked, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(session.is_revoked)
        .bind(session.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find an active session by its refresh token hash.
    ///
    /// Only returns sessions that are not revoked and not expired at `now`.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        hash: &str,
        now: Timestamp,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM refresh_sessions
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > $2"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Whether the session with `id` is neither revoked nor expired at `now`.
    pub async fn is_active(pool: &PgPool, id: &str, now: Timestamp) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM refresh_sessions
                 WHERE id = $1 AND is_revoked = false AND expires_at > $2
             )",
        )
        .bind(id)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_sessions SET is_revoked = true WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all active sessions for a user. Returns the count of revoked sessions.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
