/// Request authentication for Axum
///
/// Callers authenticate with `Authorization: Bearer <access token>`. A token
/// is accepted only if its signature and expiry are valid and the session
/// it names is still active for the same user. The user's current role is
/// read from the database so demotions take effect immediately.
///
/// On success an [`AuthContext`] is placed in the request extensions.
///
/// ```no_run
/// use axum::Extension;
/// use crickfan_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, admin: {}", auth.user_id, auth.is_admin())
/// }
/// ```
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::{session::Session, user::UserRole};

/// Authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: Uuid, session_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            session_id,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Header present but not a Bearer token
    InvalidFormat(String),

    /// Signature, expiry or type check failed
    InvalidToken(String),

    /// Session revoked, expired or unknown
    SessionInactive,

    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::SessionInactive => (
                StatusCode::UNAUTHORIZED,
                "Session has ended, please log in again".to_string(),
            ),
            AuthError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Session lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": "unauthorized",
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Extracts the Bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Maps token validation failures to auth errors
pub fn token_error(err: JwtError) -> AuthError {
    match err {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    }
}

/// Resolves request headers to an authenticated caller
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, secret).map_err(token_error)?;

    let role = Session::resolve(pool, claims.sid, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::SessionInactive)?;

    Ok(AuthContext::new(claims.sub, claims.sid, role))
}

/// Session authentication middleware
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use crickfan_shared::auth::middleware::session_auth_middleware;
/// use sqlx::PgPool;
///
/// fn routes(pool: PgPool, secret: String) -> Router {
///     Router::new()
///         .route("/me", get(|| async { "OK" }))
///         .layer(middleware::from_fn(move |req, next| {
///             session_auth_middleware(pool.clone(), secret.clone(), req, next)
///         }))
/// }
/// ```
pub async fn session_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(&pool, &secret, req.headers()).await?;
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
