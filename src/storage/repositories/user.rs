//! User account repository.
//!
//! CRUD operations for user accounts, the credential accessors used by the
//! login and recovery flows, and the account-deletion cascade plan.

use crate::auth::user::{NewUser, UpdateUser, User, UserRole};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

// Database row structures

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub recovery_email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub role: String,
    pub is_online: bool,
    pub is_confirmed: bool,
    pub otp: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, first_name, last_name, user_name, email, password_hash, \
     recovery_email, phone, date_of_birth, role, is_online, is_confirmed, otp, \
     created_at, updated_at";

/// Counts of dependent rows removed by the account-deletion cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCascadeReport {
    pub companies: u64,
    pub applications: u64,
    pub jobs: u64,
}

// Repository trait

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by exact email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user by recovery email
    async fn get_user_by_recovery_email(&self, recovery_email: &str) -> Result<Option<User>>;

    /// Check whether any user already holds one of the given identity values
    async fn identity_exists(
        &self,
        email: &str,
        phone: &str,
        recovery_email: &str,
    ) -> Result<bool>;

    /// Check whether a user other than `exclude` holds the email or phone
    async fn email_or_phone_taken(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude: &UserId,
    ) -> Result<bool>;

    /// Fetch a confirmed login candidate (by email or recovery email)
    /// together with their password hash
    async fn get_login_candidate(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Fetch a user (by email or recovery email) regardless of confirmation,
    /// together with their current one-time password
    async fn get_user_with_otp(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Update a user's profile fields
    async fn update_profile(&self, id: &UserId, update: UpdateUser) -> Result<User>;

    /// Set the online-status flag
    async fn set_online(&self, id: &UserId, is_online: bool) -> Result<()>;

    /// Flip is_confirmed false→true. Returns false when the user does not
    /// exist or was already confirmed.
    async fn confirm_email(&self, id: &UserId) -> Result<bool>;

    /// Reset is_confirmed to false (used on email change)
    async fn reset_confirmation(&self, id: &UserId) -> Result<()>;

    /// Update a user's password hash
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<()>;

    /// Update a user's password hash and rotate their one-time password
    async fn update_password_and_otp(
        &self,
        id: &UserId,
        password_hash: String,
        otp: String,
    ) -> Result<()>;

    /// Delete a user and every dependent row: their companies, their job
    /// postings, and every application they filed or that targets one of
    /// their postings. Runs as a single transaction.
    async fn delete_account_cascade(&self, id: &UserId) -> Result<UserCascadeReport>;
}

// SQLite implementation

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let role = UserRole::from_str(&row.role)
            .map_err(|_| Error::validation(format!("Unknown user role '{}'", row.role)))?;

        Ok(User {
            id: UserId::from_string(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            user_name: row.user_name,
            email: row.email,
            recovery_email: row.recovery_email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            role,
            is_online: row.is_online,
            is_confirmed: row.is_confirmed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn fetch_row(&self, query: &str, bind: &str) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to fetch user"))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_email = %user.email, user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, user_name, email, password_hash,
                               recovery_email, phone, date_of_birth, role, is_online,
                               is_confirmed, otp, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, 0, $11, $12, $13)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.recovery_email)
        .bind(&user.phone)
        .bind(user.date_of_birth)
        .bind(user.role.as_str())
        .bind(&user.otp)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to create user"))?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = self
            .fetch_row(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS), id.as_str())
            .await?;
        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .fetch_row(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS), email)
            .await?;
        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), name = "db_get_user_by_recovery_email")]
    async fn get_user_by_recovery_email(&self, recovery_email: &str) -> Result<Option<User>> {
        let row = self
            .fetch_row(
                &format!("SELECT {} FROM users WHERE recovery_email = $1", USER_COLUMNS),
                recovery_email,
            )
            .await?;
        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), name = "db_identity_exists")]
    async fn identity_exists(
        &self,
        email: &str,
        phone: &str,
        recovery_email: &str,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email = $1 OR phone = $2 OR recovery_email = $3",
        )
        .bind(email)
        .bind(phone)
        .bind(recovery_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to check user identity uniqueness"))?;

        Ok(count > 0)
    }

    #[instrument(skip(self), fields(user_id = %exclude), name = "db_email_or_phone_taken")]
    async fn email_or_phone_taken(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude: &UserId,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE id != $1
              AND ((email = $2 AND $2 IS NOT NULL) OR (phone = $3 AND $3 IS NOT NULL))
            "#,
        )
        .bind(exclude.as_str())
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to check email/phone uniqueness"))?;

        Ok(count > 0)
    }

    #[instrument(skip(self), name = "db_get_login_candidate")]
    async fn get_login_candidate(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE (email = $1 OR recovery_email = $1) AND is_confirmed = 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch login candidate"))?;

        match row {
            Some(row) => {
                let password_hash = row.password_hash.clone();
                Ok(Some((self.row_to_user(row)?, password_hash)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), name = "db_get_user_with_otp")]
    async fn get_user_with_otp(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 OR recovery_email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch user with OTP"))?;

        match row {
            Some(row) => {
                let otp = row.otp.clone();
                Ok(Some((self.row_to_user(row)?, otp)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, update), fields(user_id = %id), name = "db_update_profile")]
    async fn update_profile(&self, id: &UserId, update: UpdateUser) -> Result<User> {
        let current = self
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id.to_string()))?;

        let first_name = update.first_name.unwrap_or(current.first_name);
        let last_name = update.last_name.unwrap_or(current.last_name);
        let user_name = User::derive_user_name(&first_name, &last_name);
        let email = update.email.unwrap_or(current.email);
        let recovery_email = update.recovery_email.unwrap_or(current.recovery_email);
        let phone = update.phone.unwrap_or(current.phone);
        let date_of_birth = update.date_of_birth.unwrap_or(current.date_of_birth);

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, user_name = $3, email = $4,
                recovery_email = $5, phone = $6, date_of_birth = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&user_name)
        .bind(&email)
        .bind(&recovery_email)
        .bind(&phone)
        .bind(date_of_birth)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to update user"))?;

        self.get_user(id).await?.ok_or_else(|| Error::internal("User not found after update"))
    }

    #[instrument(skip(self), fields(user_id = %id, is_online = is_online), name = "db_set_online")]
    async fn set_online(&self, id: &UserId, is_online: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_online = $1, updated_at = $2 WHERE id = $3")
            .bind(is_online)
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to update online status"))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_confirm_email")]
    async fn confirm_email(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_confirmed = 1, updated_at = $1 WHERE id = $2 AND is_confirmed = 0",
        )
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to confirm user email"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_reset_confirmation")]
    async fn reset_confirmation(&self, id: &UserId) -> Result<()> {
        sqlx::query("UPDATE users SET is_confirmed = 0, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to reset confirmation"))?;

        Ok(())
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), name = "db_update_password")]
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(&password_hash)
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to update password"))?;

        Ok(())
    }

    #[instrument(skip(self, password_hash, otp), fields(user_id = %id), name = "db_update_password_and_otp")]
    async fn update_password_and_otp(
        &self,
        id: &UserId,
        password_hash: String,
        otp: String,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1, otp = $2, updated_at = $3 WHERE id = $4")
            .bind(&password_hash)
            .bind(&otp)
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to update password and OTP"))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_account_cascade")]
    async fn delete_account_cascade(&self, id: &UserId) -> Result<UserCascadeReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::database(err, "Failed to start account deletion"))?;

        // Collect owned job ids first; the application sweep below depends
        // on this set.
        let job_ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM jobs WHERE added_by = $1")
                .bind(id.as_str())
                .fetch_all(&mut *tx)
                .await
                .map_err(|err| Error::database(err, "Failed to collect owned jobs"))?;

        let companies = sqlx::query("DELETE FROM companies WHERE company_hr = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete owned companies"))?
            .rows_affected();

        let applications = if job_ids.is_empty() {
            sqlx::query("DELETE FROM applications WHERE user_id = $1")
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|err| Error::database(err, "Failed to delete applications"))?
                .rows_affected()
        } else {
            let mut builder =
                sqlx::QueryBuilder::new("DELETE FROM applications WHERE user_id = ");
            builder.push_bind(id.as_str());
            builder.push(" OR job_id IN (");
            {
                let mut separated = builder.separated(", ");
                for job_id in &job_ids {
                    separated.push_bind(job_id.as_str());
                }
            }
            builder.push(")");

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|err| Error::database(err, "Failed to delete applications"))?
                .rows_affected()
        };

        let jobs = sqlx::query("DELETE FROM jobs WHERE added_by = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete owned jobs"))?
            .rows_affected();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete user"))?;

        tx.commit()
            .await
            .map_err(|err| Error::database(err, "Failed to commit account deletion"))?;

        Ok(UserCascadeReport { companies, applications, jobs })
    }
}
