/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - create an account (18+, permitted state)
/// - `POST /v1/auth/login` - exchange credentials for tokens
/// - `POST /v1/auth/refresh` - new access token from a refresh token
/// - `POST /v1/auth/logout` - end the current session
/// - `GET /v1/auth/me`, `PATCH /v1/auth/me` - profile
/// - `POST /v1/auth/change-password`
/// - `POST /v1/auth/password-reset/request`, `POST /v1/auth/password-reset/confirm`
///
/// Every login or registration opens a session; both tokens carry its id and
/// stop working once it is revoked.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use crickfan_shared::{
    auth::{
        jwt::{self, Claims, TokenPair, TokenType},
        middleware::AuthContext,
        password, token,
    },
    fantasy::eligibility::{check_eligibility, check_state},
    models::{
        password_reset::PasswordResetToken,
        session::Session,
        user::{CreateUser, UpdateProfile, User},
    },
};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Generic reply for password reset requests, sent whether or not the
/// address is registered
const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for that email, a reset link has been sent";

const MAX_OPTIONAL_FIELD_LENGTH: usize = 500;

/// Widths of the matching `users` columns
const MAX_PHONE_LENGTH: usize = 20;
const MAX_CITY_LENGTH: usize = 64;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"))]
    pub full_name: String,

    pub date_of_birth: NaiveDate,

    #[validate(length(min = 1, max = 64, message = "State is required"))]
    pub state: String,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 64, message = "City must be at most 64 characters"))]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Partial profile update
///
/// `phone`, `city` and `avatar_url` may be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "State is required"))]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub city: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub avatar_url: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProfileRequest {
    fn check_nullable_lengths(&self) -> ApiResult<()> {
        let fields = [
            ("phone", &self.phone, MAX_PHONE_LENGTH),
            ("city", &self.city, MAX_CITY_LENGTH),
            ("avatar_url", &self.avatar_url, MAX_OPTIONAL_FIELD_LENGTH),
        ];

        for (field, value, max) in fields {
            if let Some(Some(v)) = value {
                if v.chars().count() > max {
                    return Err(ApiError::invalid_field(
                        field,
                        format!("Must be at most {} characters", max),
                    ));
                }
            }
        }

        Ok(())
    }

    fn into_update(self) -> UpdateProfile {
        UpdateProfile {
            full_name: self.full_name,
            phone: self.phone,
            state: self.state,
            city: self.city,
            avatar_url: self.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_revoked: Option<u64>,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            sessions_revoked: None,
        }
    }
}

fn check_strength(field: &str, candidate: &str) -> ApiResult<()> {
    password::validate_password_strength(candidate)
        .map_err(|message| ApiError::invalid_field(field, message))
}

/// Opens a session for `user` and issues its token pair
async fn start_session(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let session = Session::create(&state.db, user.id).await?;
    let tokens = jwt::issue_token_pair(user.id, session.id, user.role, state.jwt_secret())?;

    Ok(AuthResponse { user, tokens })
}

/// Register a new account
///
/// ```text
/// POST /v1/auth/register
///
/// {
///   "email": "fan@example.com",
///   "password": "SecureP@ss123",
///   "full_name": "Asha Rao",
///   "date_of_birth": "1998-04-12",
///   "state": "Karnataka"
/// }
/// ```
///
/// # Errors
///
/// - `400`: under 18 or date of birth in the future
/// - `403`: restricted state
/// - `409`: email already registered
/// - `422`: field validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    check_strength("password", &req.password)?;
    check_eligibility(req.date_of_birth, &req.state, state.today())?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            full_name: req.full_name,
            phone: req.phone,
            date_of_birth: req.date_of_birth,
            state: req.state,
            city: req.city,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let response = start_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
///
/// # Errors
///
/// - `401`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;

    let response = start_session(&state, user).await?;
    tracing::info!(user_id = %response.user.id, "User logged in");

    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
///
/// The session named by the token must still be active; the role is read
/// fresh from the database.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let role = Session::resolve(&state.db, claims.sid, claims.sub)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("Session has ended, please log in again".to_string())
        })?;

    let access = Claims::new(claims.sub, claims.sid, role, TokenType::Access);

    Ok(Json(RefreshResponse {
        access_token: jwt::create_token(&access, state.jwt_secret())?,
        expires_in: TokenType::Access.default_expiration().num_seconds(),
    }))
}

/// End the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    Session::revoke(&state.db, auth.session_id).await?;
    tracing::info!(user_id = %auth.user_id, session_id = %auth.session_id, "User logged out");

    Ok(StatusCode::NO_CONTENT)
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the current user's profile
///
/// Changing the state runs the same restricted-state check as registration.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;
    req.check_nullable_lengths()?;

    if let Some(new_state) = &req.state {
        check_state(new_state)?;
    }

    let update = req.into_update();
    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let user = User::update_profile(&state.db, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Change password and sign out every other session
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;
    check_strength("new_password", &req.new_password)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;

    let mut tx = state.db.begin().await?;
    User::update_password(&mut *tx, user.id, &password_hash).await?;
    let revoked = Session::revoke_all_for_user(&mut *tx, user.id, Some(auth.session_id)).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, sessions_revoked = revoked, "Password changed");

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
        sessions_revoked: Some(revoked),
    }))
}

/// Start a password reset
///
/// Always answers 200 so the endpoint does not reveal which accounts exist.
/// Email delivery is out of scope; the token is written to the log.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let (reset_token, token_hash) = token::generate_reset_token();
        let stored = PasswordResetToken::create(&state.db, user.id, &token_hash).await?;

        tracing::info!(
            user_id = %user.id,
            expires_at = %stored.expires_at,
            reset_token = %reset_token,
            "Password reset requested"
        );
    } else {
        tracing::debug!("Password reset requested for unknown email");
    }

    Ok(Json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

/// Complete a password reset and revoke every session of the account
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());

    if !token::is_reset_token_format(&req.token) {
        return Err(invalid());
    }
    check_strength("new_password", &req.new_password)?;

    let password_hash = password::hash_password(&req.new_password)?;

    let mut tx = state.db.begin().await?;

    let user_id = PasswordResetToken::consume(&mut *tx, &token::hash_token(&req.token))
        .await?
        .ok_or_else(invalid)?;

    User::update_password(&mut *tx, user_id, &password_hash).await?;
    let revoked = Session::revoke_all_for_user(&mut *tx, user_id, None).await?;

    tx.commit().await?;

    tracing::info!(user_id = %user_id, sessions_revoked = revoked, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password has been reset, please log in again".to_string(),
        sessions_revoked: Some(revoked),
    }))
}
