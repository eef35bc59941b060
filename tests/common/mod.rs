//! Shared test harness: a migrated SQLite database, a recording mail
//! sender, and fully wired services.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use hirelane::auth::user::{SignUpRequest, UserRole};
use hirelane::auth::{AuthService, TokenService, User, UserService};
use hirelane::config::DatabaseConfig;
use hirelane::errors::{Error, Result};
use hirelane::notifications::{EmailMessage, EmailSender};
use hirelane::services::{CompanyService, JobService};
use hirelane::storage::repositories::{
    SqlxApplicationRepository, SqlxCompanyRepository, SqlxJobRepository, SqlxUserRepository,
};
use hirelane::storage::{create_pool, DbPool};

pub const TEST_BASE_URL: &str = "http://localhost:8080";

/// A migrated throwaway database backed by a temp directory.
pub struct TestDatabase {
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!("sqlite://{}/{}.db", dir.path().display(), name);
        let config = DatabaseConfig {
            url,
            max_connections: 5,
            min_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.expect("create test pool");
        Self { pool, _dir: dir }
    }
}

/// Mail sender that records every message for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingEmailSender {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.messages.lock().unwrap().last().cloned()
    }

    /// Pull the confirmation token out of the most recent mailed link.
    pub fn last_confirmation_token(&self) -> String {
        let message = self.last().expect("no confirmation email recorded");
        let link_start = message
            .html_body
            .find("/user/confirmation/")
            .expect("no confirmation link in email");
        let token = &message.html_body[link_start + "/user/confirmation/".len()..];
        let token_end = token.find('"').expect("unterminated confirmation link");
        token[..token_end].to_string()
    }

    /// Pull the OTP out of the most recent recovery email.
    pub fn last_otp(&self) -> String {
        let message = self.last().expect("no recovery email recorded");
        let marker = "are : ";
        let start = message.html_body.find(marker).expect("no OTP in email") + marker.len();
        message.html_body[start..start + 6].to_string()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

/// Mail sender that always fails, for dispatch-failure scenarios.
#[derive(Debug, Clone, Default)]
pub struct FailingEmailSender;

#[async_trait]
impl EmailSender for FailingEmailSender {
    async fn send(&self, _message: EmailMessage) -> Result<()> {
        Err(Error::mail("SMTP transport unavailable"))
    }
}

pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        b"session-secret-for-tests-0123456789abcdef",
        b"confirm-secret-for-tests-0123456789abcdef",
    ))
}

/// Fully wired services over one database.
pub struct TestContext {
    pub db: TestDatabase,
    pub mailer: RecordingEmailSender,
    pub token_service: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub company_service: Arc<CompanyService>,
    pub job_service: Arc<JobService>,
    pub user_repository: Arc<SqlxUserRepository>,
    pub company_repository: Arc<SqlxCompanyRepository>,
    pub job_repository: Arc<SqlxJobRepository>,
    pub application_repository: Arc<SqlxApplicationRepository>,
}

impl TestContext {
    pub async fn new(name: &str) -> Self {
        let db = TestDatabase::new(name).await;
        let mailer = RecordingEmailSender::default();
        Self::with_mailer(db, mailer.clone(), Arc::new(mailer)).await
    }

    pub async fn with_failing_mailer(name: &str) -> Self {
        let db = TestDatabase::new(name).await;
        Self::with_mailer(db, RecordingEmailSender::default(), Arc::new(FailingEmailSender)).await
    }

    async fn with_mailer(
        db: TestDatabase,
        mailer: RecordingEmailSender,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        let pool = db.pool.clone();
        let user_repository = Arc::new(SqlxUserRepository::new(pool.clone()));
        let company_repository = Arc::new(SqlxCompanyRepository::new(pool.clone()));
        let job_repository = Arc::new(SqlxJobRepository::new(pool.clone()));
        let application_repository = Arc::new(SqlxApplicationRepository::new(pool));

        let token_service = test_token_service();
        let auth_service =
            Arc::new(AuthService::new(token_service.clone(), user_repository.clone()));
        let user_service = Arc::new(UserService::new(
            user_repository.clone(),
            token_service.clone(),
            sender,
            TEST_BASE_URL.to_string(),
        ));
        let company_service = Arc::new(CompanyService::new(
            company_repository.clone(),
            job_repository.clone(),
            application_repository.clone(),
        ));
        let job_service = Arc::new(JobService::new(
            job_repository.clone(),
            company_repository.clone(),
            application_repository.clone(),
        ));

        Self {
            db,
            mailer,
            token_service,
            auth_service,
            user_service,
            company_service,
            job_service,
            user_repository,
            company_repository,
            job_repository,
            application_repository,
        }
    }

    /// Sign up a user with a unique identity derived from `tag`.
    pub fn sign_up_request(tag: &str, role: UserRole) -> SignUpRequest {
        SignUpRequest {
            first_name: "Test".to_string(),
            last_name: tag.to_string(),
            email: format!("{}@example.com", tag),
            password: "correct horse battery staple".to_string(),
            recovery_email: format!("{}.backup@example.com", tag),
            date_of_birth: NaiveDate::from_ymd_opt(1993, 6, 1).unwrap(),
            phone: format!(
                "+2010{:0>8}",
                tag.bytes().fold(7919u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
                    % 100_000_000
            ),
            role,
        }
    }

    /// Sign up and confirm an account, returning the live user.
    pub async fn confirmed_user(&self, tag: &str, role: UserRole) -> User {
        self.user_service
            .sign_up(Self::sign_up_request(tag, role))
            .await
            .expect("sign up failed");
        let token = self.mailer.last_confirmation_token();
        self.user_service.confirm_email(&token).await.expect("confirmation failed")
    }
}
