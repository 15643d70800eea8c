/// Login sessions
///
/// Every issued JWT names a session. A session is active while it is
/// neither revoked nor past `expires_at`.
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::user::UserRole;

/// Session lifetime, matching the refresh token lifetime
pub const SESSION_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Opens a new session for a user
    pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, expires_at)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at, expires_at, last_seen_at, revoked_at
            "#,
        )
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Checks that the session is active for `user_id` and returns the
    /// user's current role, bumping `last_seen_at`
    pub async fn resolve(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserRole>, sqlx::Error> {
        sqlx::query_scalar::<_, UserRole>(
            r#"
            UPDATE sessions s
            SET last_seen_at = NOW()
            FROM users u
            WHERE s.id = $1
              AND s.user_id = $2
              AND u.id = s.user_id
              AND s.revoked_at IS NULL
              AND s.expires_at > NOW()
            RETURNING u.role
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Revokes one session. Returns false if it was already inactive.
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every active session of a user, optionally sparing one
    pub async fn revoke_all_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET revoked_at = NOW()
            WHERE user_id = $1
              AND revoked_at IS NULL
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(user_id)
        .bind(except)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

