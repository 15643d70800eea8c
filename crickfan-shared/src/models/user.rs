/// User accounts
///
/// Emails are stored lowercased (the column has a check constraint) so
/// lookups are case-insensitive as long as callers go through
/// [`normalize_email`].
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use crickfan_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "Fan@Example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         full_name: "Rohit Fan".to_string(),
///         phone: None,
///         date_of_birth: NaiveDate::from_ymd_opt(1994, 4, 30).unwrap(),
///         state: "Maharashtra".to_string(),
///         city: Some("Mumbai".to_string()),
///     },
/// )
/// .await?;
///
/// assert_eq!(user.email, "fan@example.com");
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, phone, date_of_birth, state, \
                            city, role, avatar_url, created_at, updated_at, last_login_at";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,

    /// Argon2id PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    pub state: String,
    pub city: Option<String>,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Registration data
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    /// Already hashed
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    pub state: String,
    pub city: Option<String>,
}

/// Profile changes. `None` leaves a field untouched, `Some(None)` clears an
/// optional one.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub state: Option<String>,
    pub city: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.state.is_none()
            && self.city.is_none()
            && self.avatar_url.is_none()
    }
}

/// Trims and lowercases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, phone, date_of_birth, state, city)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(&data.email))
            .bind(data.password_hash)
            .bind(data.full_name.trim())
            .bind(data.phone)
            .bind(data.date_of_birth)
            .bind(data.state.trim())
            .bind(data.city)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial profile update, returning the updated row
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        let mut push = |column: &str, query: &mut String| {
            bind_count += 1;
            query.push_str(&format!(", {} = ${}", column, bind_count));
        };

        if data.full_name.is_some() {
            push("full_name", &mut query);
        }
        if data.phone.is_some() {
            push("phone", &mut query);
        }
        if data.state.is_some() {
            push("state", &mut query);
        }
        if data.city.is_some() {
            push("city", &mut query);
        }
        if data.avatar_url.is_some() {
            push("avatar_url", &mut query);
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(full_name) = data.full_name {
            q = q.bind(full_name.trim().to_string());
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(state) = data.state {
            q = q.bind(state.trim().to_string());
        }
        if let Some(city) = data.city {
            q = q.bind(city);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }

        q.fetch_optional(pool).await
    }

    /// Replaces the password hash; runs inside the caller's transaction
    pub async fn update_password(
        conn: &mut PgConnection,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn set_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
