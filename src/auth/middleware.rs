//! Axum middleware for authentication and authorization.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, warn};

use crate::api::error::ApiError;
use crate::auth::auth_service::AuthService;
use crate::auth::models::{AuthContext, AuthError};
use crate::auth::user::UserRole;

pub type AuthServiceState = Arc<AuthService>;
pub type RoleState = Arc<Vec<UserRole>>;

/// Middleware entry point that authenticates requests using the configured
/// [`AuthService`] and attaches the resolved identity as a request extension.
pub async fn authenticate(
    State(auth_service): State<AuthServiceState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %method,
        http.path = %path,
    );
    let _guard = span.enter();

    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()).unwrap_or("");

    match auth_service.authenticate(header).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(error = %err, "authentication failed");
            Err(map_auth_error(err))
        }
    }
}

/// Middleware entry point that verifies the authenticated identity's role is
/// a member of the route's permitted role set.
pub async fn require_roles(
    State(allowed): State<RoleState>,
    Extension(context): Extension<AuthContext>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if context.has_any_role(&allowed) {
        return Ok(next.run(request).await);
    }

    let allowed_summary =
        allowed.iter().map(|role| role.as_str()).collect::<Vec<_>>().join(" ");
    warn!(
        user_id = %context.user_id(),
        role = %context.role(),
        allowed = %allowed_summary,
        http.path = %request.uri().path(),
        "role check failed"
    );
    Err(map_auth_error(AuthError::Forbidden))
}

fn map_auth_error(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingBearer
        | AuthError::MalformedBearer
        | AuthError::InvalidToken
        | AuthError::ExpiredToken
        | AuthError::UserNotFound => ApiError::unauthorized(err.to_string()),
        AuthError::Forbidden => ApiError::forbidden(err.to_string()),
        AuthError::Persistence(inner) => {
            ApiError::internal(format!("auth service unavailable: {}", inner))
        }
    }
}
