//! User account API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::user::{
    ChangePasswordRequest, ForgetPasswordRequest, LoginRequest, LoginResponse, SignUpRequest,
    UpdatePasswordRequest, UpdateUserRequest, UserResponse,
};
use crate::domain::UserId;

/// Message-only response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Message plus user response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub message: String,
    pub user: UserResponse,
}

/// User-only response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    pub user: UserResponse,
}

/// Query parameters for the recovery-email lookup.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryEmailQuery {
    pub recovery_email: String,
}

/// Create an unconfirmed account and mail a confirmation link.
#[utoipa::path(
    post,
    path = "/user/signUp",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created, confirmation email sent", body = UserEnvelope),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email, phone, or recovery email already exists"),
        (status = 500, description = "Confirmation email dispatch failed")
    ),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn sign_up(
    State(state): State<ApiState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = state.user_service.sign_up(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope { message: "user created".to_string(), user: user.into() }),
    ))
}

/// Confirm an account via the emailed token.
#[utoipa::path(
    get,
    path = "/user/confirmation/{confirmationToken}",
    params(("confirmationToken" = String, Path, description = "Emailed confirmation token")),
    responses(
        (status = 200, description = "Email confirmed", body = UserEnvelope),
        (status = 401, description = "Invalid or expired token"),
        (status = 404, description = "User missing or already confirmed")
    ),
    tag = "users"
)]
#[instrument(skip(state, token))]
pub async fn confirm_email(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = state.user_service.confirm_email(&token).await?;

    Ok(Json(UserEnvelope {
        message: "User email successfully confirmed".to_string(),
        user: user.into(),
    }))
}

/// Verify credentials and issue a session token.
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (_user, token) = state.user_service.login(&payload).await?;

    Ok(Json(LoginResponse { message: "Login success".to_string(), token }))
}

/// Mark the authenticated user offline.
#[utoipa::path(
    patch,
    path = "/user/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state), fields(user_id = %context.user_id()))]
pub async fn logout(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.logout(context.user_id()).await?;

    Ok(Json(MessageResponse { message: "logged out successfully".to_string() }))
}

/// Update the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/user/update",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelope),
        (status = 401, description = "Unauthenticated"),
        (status = 409, description = "Email or phone already exists"),
        (status = 500, description = "Confirmation email dispatch failed")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id()))]
pub async fn update_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = state.user_service.update_profile(&context.user, payload).await?;

    Ok(Json(UserEnvelope { message: "user updated".to_string(), user: user.into() }))
}

/// Delete the authenticated user's account and every dependent row.
#[utoipa::path(
    delete,
    path = "/user/delete",
    responses(
        (status = 200, description = "User deleted with dependents", body = MessageResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state), fields(user_id = %context.user_id()))]
pub async fn delete_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.delete_account(context.user_id()).await?;

    Ok(Json(MessageResponse { message: "user deleted".to_string() }))
}

/// Fetch the authenticated user's own record.
#[utoipa::path(
    get,
    path = "/user/getInfo",
    responses(
        (status = 200, description = "User record", body = UserBody),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state), fields(user_id = %context.user_id()))]
pub async fn get_info(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<UserBody>, ApiError> {
    let user = state.user_service.get_info(context.user_id()).await?;

    Ok(Json(UserBody { user: user.into() }))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/user/getById/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User record", body = UserBody),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state), fields(target_user_id = %id))]
pub async fn get_by_id(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<UserBody>, ApiError> {
    let user = state.user_service.get_by_id(&UserId::from_string(id)).await?;

    Ok(Json(UserBody { user: user.into() }))
}

/// Set a new password for the authenticated user.
#[utoipa::path(
    patch,
    path = "/user/updatePass",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UserEnvelope),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id()))]
pub async fn update_password(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = state.user_service.update_password(context.user_id(), &payload.password).await?;

    Ok(Json(UserEnvelope { message: "user password updated".to_string(), user: user.into() }))
}

/// Look up the account holding a recovery email.
#[utoipa::path(
    get,
    path = "/user/recoveryEmail",
    params(RecoveryEmailQuery),
    responses(
        (status = 200, description = "User record", body = UserBody),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "No user holds that recovery email")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, query))]
pub async fn get_by_recovery_email(
    State(state): State<ApiState>,
    Query(query): Query<RecoveryEmailQuery>,
) -> Result<Json<UserBody>, ApiError> {
    let user = state.user_service.get_by_recovery_email(&query.recovery_email).await?;

    Ok(Json(UserBody { user: user.into() }))
}

/// Start password recovery: mail the account's one-time password.
#[utoipa::path(
    post,
    path = "/user/forgetPass",
    request_body = ForgetPasswordRequest,
    responses(
        (status = 200, description = "Recovery OTP mailed", body = MessageResponse),
        (status = 404, description = "Email doesn't exist"),
        (status = 500, description = "Recovery email dispatch failed")
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn forget_password(
    State(state): State<ApiState>,
    Json(payload): Json<ForgetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    state.user_service.forget_password(&payload.email).await?;

    Ok(Json(MessageResponse { message: "check your email".to_string() }))
}

/// Complete password recovery with the mailed one-time password.
#[utoipa::path(
    patch,
    path = "/user/changePass",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = UserEnvelope),
        (status = 401, description = "OTP is wrong"),
        (status = 404, description = "Email doesn't exist")
    ),
    tag = "users"
)]
#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<ApiState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = state.user_service.change_password(&payload).await?;

    Ok(Json(UserEnvelope { message: "password changed".to_string(), user: user.into() }))
}
