//! Request-scoped authentication context and middleware error types.

use thiserror::Error;

use crate::auth::user::{User, UserRole};
use crate::domain::UserId;
use crate::errors::Error;

/// Request-scoped authentication context derived from a valid session token.
/// Carries the live user record so downstream handlers never re-fetch it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Role-set membership check used by the authorization middleware.
    pub fn has_any_role(&self, allowed: &[UserRole]) -> bool {
        allowed.contains(&self.user.role)
    }
}

/// Errors returned by authentication middleware/services.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: bearer token missing")]
    MissingBearer,
    #[error("unauthorized: malformed bearer token")]
    MalformedBearer,
    #[error("unauthorized: invalid token")]
    InvalidToken,
    #[error("unauthorized: token expired")]
    ExpiredToken,
    #[error("unauthorized: user no longer exists")]
    UserNotFound,
    #[error("forbidden: role not permitted for this route")]
    Forbidden,
    #[error(transparent)]
    Persistence(#[from] Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn user_with_role(role: UserRole) -> User {
        User {
            id: UserId::new(),
            first_name: "Omar".to_string(),
            last_name: "Said".to_string(),
            user_name: "Omar Said".to_string(),
            email: "omar@example.com".to_string(),
            recovery_email: "omar.backup@example.com".to_string(),
            phone: "+201009876543".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            role,
            is_online: true,
            is_confirmed: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_set_membership() {
        let ctx = AuthContext::new(user_with_role(UserRole::CompanyHr));

        assert!(ctx.has_any_role(&[UserRole::CompanyHr]));
        assert!(ctx.has_any_role(&[UserRole::User, UserRole::CompanyHr]));
        assert!(!ctx.has_any_role(&[UserRole::User]));
    }

    #[test]
    fn context_exposes_user_identity() {
        let user = user_with_role(UserRole::User);
        let id = user.id.clone();
        let ctx = AuthContext::new(user);

        assert_eq!(ctx.user_id(), &id);
        assert_eq!(ctx.role(), UserRole::User);
    }
}
