//! JWT issuance and verification for login sessions and email confirmation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::user::User;
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};

/// Session tokens live for one day.
pub const SESSION_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Confirmation tokens live for one hour.
pub const CONFIRMATION_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims carried by a login session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by an email confirmation token. Embeds a snapshot of the
/// user record at issuance time rather than just an id; the confirmation
/// handler matches on the snapshot's id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfirmationClaims {
    pub user: User,
    pub exp: i64,
    pub iat: i64,
}

/// Signed-token service. Session and confirmation tokens are signed with
/// separate secrets so one class of token can never stand in for the other.
pub struct TokenService {
    session_encoding: EncodingKey,
    session_decoding: DecodingKey,
    confirmation_encoding: EncodingKey,
    confirmation_decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(session_secret: &[u8], confirmation_secret: &[u8]) -> Self {
        Self {
            session_encoding: EncodingKey::from_secret(session_secret),
            session_decoding: DecodingKey::from_secret(session_secret),
            confirmation_encoding: EncodingKey::from_secret(confirmation_secret),
            confirmation_decoding: DecodingKey::from_secret(confirmation_secret),
            validation: Validation::default(),
        }
    }

    /// Issue a session token for the given user with a fixed 1-day expiry.
    pub fn issue_session_token(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims =
            SessionClaims { sub: user_id.to_string(), iat: now, exp: now + SESSION_TOKEN_TTL_SECS };

        encode(&Header::default(), &claims, &self.session_encoding)
            .map_err(|err| Error::internal(format!("Failed to sign session token: {}", err)))
    }

    /// Issue a confirmation token embedding the user snapshot, 1-hour expiry.
    pub fn issue_confirmation_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = ConfirmationClaims {
            user: user.clone(),
            iat: now,
            exp: now + CONFIRMATION_TOKEN_TTL_SECS,
        };

        encode(&Header::default(), &claims, &self.confirmation_encoding)
            .map_err(|err| Error::internal(format!("Failed to sign confirmation token: {}", err)))
    }

    /// Verify a session token, returning its claims.
    pub fn verify_session_token(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.session_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Verify a confirmation token, returning its claims.
    pub fn verify_confirmation_token(&self, token: &str) -> Result<ConfirmationClaims> {
        decode::<ConfirmationClaims>(token, &self.confirmation_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> Error {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => {
            Error::auth("Token has expired", AuthErrorType::ExpiredToken)
        }
        _ => Error::auth("Invalid token", AuthErrorType::InvalidToken),
    }
}
