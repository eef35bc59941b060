//! Account lifecycle service: signup, confirmation, login/logout, profile
//! updates, password management, and account deletion with its cascade.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::jwt::TokenService;
use crate::auth::otp::generate_otp;
use crate::auth::user::{
    ChangePasswordRequest, LoginRequest, NewUser, SignUpRequest, UpdateUser, UpdateUserRequest,
    User,
};
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};
use crate::notifications::{EmailMessage, EmailSender};
use crate::observability::metrics;
use crate::storage::repositories::{UserCascadeReport, UserRepository};

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run Argon2 verification
/// against this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Service for the user account lifecycle.
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
    email_sender: Arc<dyn EmailSender>,
    /// Base URL used when building confirmation links.
    public_base_url: String,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        token_service: Arc<TokenService>,
        email_sender: Arc<dyn EmailSender>,
        public_base_url: String,
    ) -> Self {
        Self { user_repository, token_service, email_sender, public_base_url }
    }

    fn confirmation_link(&self, token: &str) -> String {
        format!("{}/user/confirmation/{}", self.public_base_url.trim_end_matches('/'), token)
    }

    async fn send_confirmation_email(&self, user: &User, to: &str) -> Result<()> {
        let token = self.token_service.issue_confirmation_token(user)?;
        let link = self.confirmation_link(&token);

        let outcome = self
            .email_sender
            .send(EmailMessage {
                to: to.to_string(),
                subject: "welcome".to_string(),
                html_body: format!("<a href=\"{}\">please verify your account</a>", link),
            })
            .await;

        match outcome {
            Ok(()) => {
                metrics::record_mail_dispatch("success");
                Ok(())
            }
            Err(err) => {
                metrics::record_mail_dispatch("failure");
                warn!(user_id = %user.id, error = %err, "confirmation email dispatch failed");
                Err(err)
            }
        }
    }

    /// Create an unconfirmed account and mail a confirmation link.
    ///
    /// A mail dispatch failure surfaces as an error but does not roll back
    /// the already-created user record.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User> {
        let email = User::normalize_email(&request.email);
        let recovery_email = User::normalize_email(&request.recovery_email);

        if self
            .user_repository
            .identity_exists(&email, &request.phone, &recovery_email)
            .await?
        {
            return Err(Error::conflict("Email or phone already exists", "User"));
        }

        let otp = generate_otp();
        let password_hash = hashing::hash_password(&request.password)?;
        let user_name = User::derive_user_name(&request.first_name, &request.last_name);

        let user = self
            .user_repository
            .create_user(NewUser {
                id: UserId::new(),
                first_name: request.first_name,
                last_name: request.last_name,
                user_name,
                email: email.clone(),
                password_hash,
                recovery_email,
                phone: request.phone,
                date_of_birth: request.date_of_birth,
                role: request.role,
                otp,
            })
            .await?;

        info!(user_id = %user.id, "user account created, awaiting confirmation");
        self.send_confirmation_email(&user, &email).await?;

        Ok(user)
    }

    /// Flip a user's confirmation flag via an emailed token. A token whose
    /// user is already confirmed (or gone) fails rather than succeeding
    /// twice.
    #[instrument(skip(self, token))]
    pub async fn confirm_email(&self, token: &str) -> Result<User> {
        let claims = self.token_service.verify_confirmation_token(token)?;
        let user_id = claims.user.id;

        let flipped = self.user_repository.confirm_email(&user_id).await?;
        if !flipped {
            return Err(Error::not_found("Unconfirmed user", user_id.to_string()));
        }

        let user = self
            .user_repository
            .get_user(&user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id.to_string()))?;

        info!(user_id = %user.id, "user email confirmed");
        Ok(user)
    }

    /// Verify credentials, mark the account online, and issue a session
    /// token. The email field also matches the account's recovery email;
    /// only confirmed accounts can log in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<(User, String)> {
        let email = User::normalize_email(&request.email);

        let (user, password_hash) = match self.user_repository.get_login_candidate(&email).await? {
            Some(found) => found,
            None => {
                // Prevent timing-based user enumeration: perform dummy hash
                // verification so response time matches real verification
                if let Err(e) = hashing::verify_password(&request.password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!(email = %email, "login attempt for unknown or unconfirmed account");
                metrics::record_authentication("invalid_credentials");
                return Err(Error::auth(
                    "Invalid credentials",
                    AuthErrorType::InvalidCredentials,
                ));
            }
        };

        if !hashing::verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "login attempt with incorrect password");
            metrics::record_authentication("invalid_credentials");
            return Err(Error::auth("Invalid credentials", AuthErrorType::InvalidCredentials));
        }

        self.user_repository.set_online(&user.id, true).await?;
        let token = self.token_service.issue_session_token(&user.id)?;

        metrics::record_authentication("success");
        info!(user_id = %user.id, "user logged in");

        let user = self
            .user_repository
            .get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after login"))?;

        Ok((user, token))
    }

    /// Mark the account offline.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn logout(&self, user_id: &UserId) -> Result<()> {
        self.user_repository.set_online(user_id, false).await?;
        info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    /// Fetch the authenticated user's own record.
    pub async fn get_info(&self, user_id: &UserId) -> Result<User> {
        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id.to_string()))
    }

    /// Fetch any user by id.
    pub async fn get_by_id(&self, user_id: &UserId) -> Result<User> {
        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id.to_string()))
    }

    /// Look up the account holding the given recovery email.
    pub async fn get_by_recovery_email(&self, recovery_email: &str) -> Result<User> {
        let recovery_email = User::normalize_email(recovery_email);
        self.user_repository
            .get_user_by_recovery_email(&recovery_email)
            .await?
            .ok_or_else(|| Error::not_found("User", recovery_email))
    }

    /// Update the authenticated user's profile. Changing the email resets the
    /// confirmation flag and re-sends a confirmation link to the new address;
    /// a mail dispatch failure surfaces as an error but the profile update is
    /// not rolled back.
    #[instrument(skip(self, current, request), fields(user_id = %current.id))]
    pub async fn update_profile(
        &self,
        current: &User,
        request: UpdateUserRequest,
    ) -> Result<User> {
        let new_email = request.email.as_deref().map(User::normalize_email);
        let new_recovery = request.recovery_email.as_deref().map(User::normalize_email);

        if new_email.is_some() || request.phone.is_some() {
            let taken = self
                .user_repository
                .email_or_phone_taken(
                    new_email.as_deref(),
                    request.phone.as_deref(),
                    &current.id,
                )
                .await?;
            if taken {
                return Err(Error::conflict("Email or phone already exists", "User"));
            }
        }

        let email_changed =
            new_email.as_deref().map(|email| email != current.email).unwrap_or(false);

        let user = self
            .user_repository
            .update_profile(
                &current.id,
                UpdateUser {
                    first_name: request.first_name,
                    last_name: request.last_name,
                    email: new_email,
                    recovery_email: new_recovery,
                    phone: request.phone,
                    date_of_birth: request.date_of_birth,
                },
            )
            .await?;

        if email_changed {
            self.user_repository.reset_confirmation(&user.id).await?;
            let user = self
                .user_repository
                .get_user(&user.id)
                .await?
                .ok_or_else(|| Error::internal("User not found after update"))?;

            let to = user.email.clone();
            self.send_confirmation_email(&user, &to).await?;
            return Ok(user);
        }

        Ok(user)
    }

    /// Set a new password for the authenticated user.
    #[instrument(skip(self, password), fields(user_id = %user_id))]
    pub async fn update_password(&self, user_id: &UserId, password: &str) -> Result<User> {
        let password_hash = hashing::hash_password(password)?;
        self.user_repository.update_password(user_id, password_hash).await?;

        self.user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id.to_string()))
    }

    /// Start password recovery: mail the account's stored one-time password.
    #[instrument(skip(self, email))]
    pub async fn forget_password(&self, email: &str) -> Result<()> {
        let email = User::normalize_email(email);
        let (user, otp) = self
            .user_repository
            .get_user_with_otp(&email)
            .await?
            .ok_or_else(|| Error::not_found("User", email.clone()))?;

        let outcome = self
            .email_sender
            .send(EmailMessage {
                to: email,
                subject: "password recovery".to_string(),
                html_body: format!(
                    "<h1>your otp numbers for reseting the password are : {}</h1>",
                    otp
                ),
            })
            .await;

        match outcome {
            Ok(()) => {
                metrics::record_mail_dispatch("success");
                info!(user_id = %user.id, "recovery OTP mailed");
                Ok(())
            }
            Err(err) => {
                metrics::record_mail_dispatch("failure");
                warn!(user_id = %user.id, error = %err, "recovery email dispatch failed");
                Err(err)
            }
        }
    }

    /// Complete password recovery: check the mailed one-time password, set
    /// the new password, and rotate the stored OTP so the old code cannot be
    /// replayed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<User> {
        let email = User::normalize_email(&request.email);
        let (user, otp) = self
            .user_repository
            .get_user_with_otp(&email)
            .await?
            .ok_or_else(|| Error::not_found("User", email))?;

        if otp != request.otp {
            warn!(user_id = %user.id, "password recovery with wrong OTP");
            metrics::record_authentication("invalid_otp");
            return Err(Error::auth("OTP is wrong", AuthErrorType::InvalidCredentials));
        }

        let password_hash = hashing::hash_password(&request.password)?;
        let new_otp = generate_otp();
        self.user_repository.update_password_and_otp(&user.id, password_hash, new_otp).await?;

        info!(user_id = %user.id, "password changed via recovery flow");
        self.user_repository
            .get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after password change"))
    }

    /// Delete the account and every dependent row (companies, jobs,
    /// applications) in one transaction.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_account(&self, user_id: &UserId) -> Result<UserCascadeReport> {
        let report = self.user_repository.delete_account_cascade(user_id).await?;
        metrics::record_cascade_delete(
            "user",
            report.companies + report.jobs + report.applications,
        );
        info!(
            user_id = %user_id,
            companies = report.companies,
            jobs = report.jobs,
            applications = report.applications,
            "user account deleted with dependents"
        );
        Ok(report)
    }
}
