//! Bearer-token authentication service used by the middleware layer.

use std::sync::Arc;

use tracing::instrument;

use crate::auth::jwt::TokenService;
use crate::auth::models::{AuthContext, AuthError};
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error};
use crate::storage::repositories::UserRepository;

/// Resolves an `Authorization` header into an authenticated identity.
pub struct AuthService {
    token_service: Arc<TokenService>,
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(token_service: Arc<TokenService>, user_repository: Arc<dyn UserRepository>) -> Self {
        Self { token_service, user_repository }
    }

    /// Authenticate a request's `Authorization` header value. The token must
    /// be a bearer session token whose subject still resolves to a live user.
    #[instrument(skip(self, header), name = "auth_authenticate")]
    pub async fn authenticate(&self, header: &str) -> Result<AuthContext, AuthError> {
        if header.is_empty() {
            return Err(AuthError::MissingBearer);
        }

        let token = header.strip_prefix("Bearer ").ok_or(AuthError::MalformedBearer)?;
        if token.is_empty() {
            return Err(AuthError::MalformedBearer);
        }

        let claims = self.token_service.verify_session_token(token).map_err(|err| match err {
            Error::Auth { error_type: AuthErrorType::ExpiredToken, .. } => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        let user_id = UserId::from_string(claims.sub);
        let user = self
            .user_repository
            .get_user(&user_id)
            .await
            .map_err(AuthError::Persistence)?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthContext::new(user))
    }
}
