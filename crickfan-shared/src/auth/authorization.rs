/// Authorization checks
///
/// Two roles exist: regular users and admins. Admins manage contests, sync
/// match data and settle matches. A fantasy team is visible to its owner
/// and to admins.
use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Admin access required")]
    AdminRequired,

    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Requires the caller to own the resource or be an admin
pub fn require_owner_or_admin(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == owner_id || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotAuthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn context(role: UserRole) -> AuthContext {
        AuthContext::new(Uuid::new_v4(), Uuid::new_v4(), role)
    }

    #[test]
    fn test_require_admin() {
        assert_eq!(require_admin(&context(UserRole::Admin)), Ok(()));
        assert_eq!(
            require_admin(&context(UserRole::User)),
            Err(AuthzError::AdminRequired)
        );
    }

    #[test]
    fn test_require_owner_or_admin() {
        let user = context(UserRole::User);
        let admin = context(UserRole::Admin);
        let someone_else = Uuid::new_v4();

        assert_eq!(require_owner_or_admin(&user, user.user_id), Ok(()));
        assert_eq!(
            require_owner_or_admin(&user, someone_else),
            Err(AuthzError::NotAuthorized)
        );
        assert_eq!(require_owner_or_admin(&admin, someone_else), Ok(()));
    }
}
