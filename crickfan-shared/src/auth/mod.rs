/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: session-bound access and refresh tokens
/// - [`token`]: single-use password reset tokens
/// - [`middleware`]: Axum middleware that resolves the caller's session
/// - [`authorization`]: admin and ownership checks
///
/// # Example
///
/// ```no_run
/// use crickfan_shared::auth::password::{hash_password, verify_password};
/// use crickfan_shared::auth::jwt::issue_token_pair;
/// use crickfan_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Straight-drive4")?;
/// assert!(verify_password("Straight-drive4", &hash)?);
///
/// let pair = issue_token_pair(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;
