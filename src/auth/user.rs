//! User domain models and data structures.
//!
//! Defines the user account entity, its role enumeration, and the
//! request/response DTOs for the account lifecycle endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::UserId;

/// Closed role enumeration. Authorization rules are expressed as membership
/// in a set of these variants, never as string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "company_hr")]
    CompanyHr,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::CompanyHr => "company_hr",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "company_hr" => Ok(UserRole::CompanyHr),
            other => Err(UserRoleParseError(other.to_string())),
        }
    }
}

/// Error returned when role parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid user role: {0}")]
pub struct UserRoleParseError(pub String);

/// Stored representation of a user account. The password hash and the
/// current one-time password never leave the storage layer through this type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub recovery_email: String,
    pub phone: String,
    #[serde(rename = "DOB")]
    pub date_of_birth: NaiveDate,
    pub role: UserRole,
    /// Online-status flag: login sets it, logout clears it.
    pub is_online: bool,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Normalize email to lowercase for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Derive the display name from first and last name.
    pub fn derive_user_name(first_name: &str, last_name: &str) -> String {
        format!("{} {}", first_name, last_name)
    }
}

/// New user creation payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub recovery_email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub role: UserRole,
    pub otp: String,
}

/// Update payload for an existing user's profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub recovery_email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid recovery email"))]
    pub recovery_email: String,
    #[serde(rename = "DOB")]
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
}

/// User authentication credentials. The email field also accepts the
/// account's recovery email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Request to update the authenticated user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(email(message = "Invalid recovery email"))]
    pub recovery_email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "DOB")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Request to set a new password for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request to start password recovery; mails the account's one-time password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
}

/// Request to complete password recovery with the mailed one-time password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "OTP cannot be empty"))]
    pub otp: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Public view of a user account. Never carries the password hash or OTP.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub recovery_email: String,
    pub phone: String,
    #[serde(rename = "DOB")]
    pub date_of_birth: NaiveDate,
    pub role: UserRole,
    pub is_online: bool,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            user_name: user.user_name,
            email: user.email,
            recovery_email: user.recovery_email,
            phone: user.phone,
            date_of_birth: user.date_of_birth,
            role: user.role,
            is_online: user.is_online,
            is_confirmed: user.is_confirmed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        User {
            id: UserId::new(),
            first_name: "Amira".to_string(),
            last_name: "Hassan".to_string(),
            user_name: "Amira Hassan".to_string(),
            email: "amira@example.com".to_string(),
            recovery_email: "amira.backup@example.com".to_string(),
            phone: "+201001234567".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
            role,
            is_online: false,
            is_confirmed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_role_round_trip() {
        for (input, expected) in [("user", UserRole::User), ("company_hr", UserRole::CompanyHr)] {
            let parsed = input.parse::<UserRole>().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), input);
        }

        let err = "admin".parse::<UserRole>().unwrap_err();
        assert_eq!(err.0, "admin");
    }

    #[test]
    fn email_normalization() {
        assert_eq!(User::normalize_email("Test@Example.COM"), "test@example.com");
        assert_eq!(User::normalize_email("  user@HOST.com  "), "user@host.com");
    }

    #[test]
    fn user_name_derivation() {
        assert_eq!(User::derive_user_name("Amira", "Hassan"), "Amira Hassan");
    }

    #[test]
    fn sign_up_request_defaults_role_to_user() {
        let json = r#"{
            "firstName": "Amira",
            "lastName": "Hassan",
            "email": "amira@example.com",
            "password": "s3cret-pass",
            "recoveryEmail": "amira.backup@example.com",
            "DOB": "1995-04-12",
            "phone": "+201001234567"
        }"#;

        let request: SignUpRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.role, UserRole::User);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn sign_up_request_rejects_short_password() {
        let request = SignUpRequest {
            first_name: "Amira".to_string(),
            last_name: "Hassan".to_string(),
            email: "amira@example.com".to_string(),
            password: "short".to_string(),
            recovery_email: "amira.backup@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
            phone: "+201001234567".to_string(),
            role: UserRole::User,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn user_response_omits_credentials() {
        let user = sample_user(UserRole::CompanyHr);
        let response: UserResponse = user.clone().into();
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"DOB\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("otp"));
        assert_eq!(response.role, UserRole::CompanyHr);
    }
}
