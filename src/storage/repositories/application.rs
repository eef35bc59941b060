//! Job application repository.

use crate::auth::user::{User, UserRole};
use crate::domain::{Application, ApplicationId, JobId, NewApplication, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct ApplicationRow {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub user_tech_skills: String,
    pub user_soft_skills: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Left-join row for the applicant-enriched listing.
#[derive(Debug, Clone, FromRow)]
struct ApplicationWithApplicantRow {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub user_tech_skills: String,
    pub user_soft_skills: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub applicant_first_name: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_user_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_recovery_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_date_of_birth: Option<NaiveDate>,
    pub applicant_role: Option<String>,
    pub applicant_is_online: Option<bool>,
    pub applicant_is_confirmed: Option<bool>,
    pub applicant_created_at: Option<DateTime<Utc>>,
    pub applicant_updated_at: Option<DateTime<Utc>>,
}

const APPLICATION_COLUMNS: &str =
    "id, job_id, user_id, user_tech_skills, user_soft_skills, created_at, updated_at";

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Create a new application
    async fn create_application(&self, application: NewApplication) -> Result<Application>;

    /// Get an application by ID
    async fn get_application(&self, id: &ApplicationId) -> Result<Option<Application>>;

    /// List all applications for a job
    async fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>>;

    /// List all applications for a job, each with the applicant's user record
    /// when the applicant still exists
    async fn list_by_job_with_applicant(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<(Application, Option<User>)>>;

    /// Count applications referencing a job
    async fn count_by_job(&self, job_id: &JobId) -> Result<i64>;

    /// Count applications filed by a user
    async fn count_by_user(&self, user_id: &UserId) -> Result<i64>;
}

#[derive(Debug, Clone)]
pub struct SqlxApplicationRepository {
    pool: DbPool,
}

impl SqlxApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_skills(raw: &str) -> Result<Vec<String>> {
        serde_json::from_str(raw)
            .map_err(|err| Error::internal(format!("Failed to parse skills JSON: {}", err)))
    }

    fn row_to_application(&self, row: ApplicationRow) -> Result<Application> {
        Ok(Application {
            id: ApplicationId::from_string(row.id),
            job_id: JobId::from_string(row.job_id),
            user_id: UserId::from_string(row.user_id),
            user_tech_skills: Self::parse_skills(&row.user_tech_skills)?,
            user_soft_skills: Self::parse_skills(&row.user_soft_skills)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ApplicationRepository for SqlxApplicationRepository {
    #[instrument(skip(self, application), fields(job_id = %application.job_id, user_id = %application.user_id), name = "db_create_application")]
    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        let tech_skills = serde_json::to_string(&application.user_tech_skills)
            .map_err(|err| Error::internal(format!("Failed to serialize skills: {}", err)))?;
        let soft_skills = serde_json::to_string(&application.user_soft_skills)
            .map_err(|err| Error::internal(format!("Failed to serialize skills: {}", err)))?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, user_id, user_tech_skills, user_soft_skills,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id.as_str())
        .bind(application.job_id.as_str())
        .bind(application.user_id.as_str())
        .bind(&tech_skills)
        .bind(&soft_skills)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to create application"))?;

        self.get_application(&application.id)
            .await?
            .ok_or_else(|| Error::internal("Application not found after creation"))
    }

    #[instrument(skip(self), fields(application_id = %id), name = "db_get_application")]
    async fn get_application(&self, id: &ApplicationId) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch application"))?;

        row.map(|r| self.row_to_application(r)).transpose()
    }

    #[instrument(skip(self), fields(job_id = %job_id), name = "db_list_applications_by_job")]
    async fn list_by_job(&self, job_id: &JobId) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY created_at",
            APPLICATION_COLUMNS
        ))
        .bind(job_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to list applications"))?;

        rows.into_iter().map(|r| self.row_to_application(r)).collect()
    }

    #[instrument(skip(self), fields(job_id = %job_id), name = "db_list_applications_with_applicant")]
    async fn list_by_job_with_applicant(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<(Application, Option<User>)>> {
        let rows = sqlx::query_as::<_, ApplicationWithApplicantRow>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.user_tech_skills, a.user_soft_skills,
                   a.created_at, a.updated_at,
                   u.first_name AS applicant_first_name,
                   u.last_name AS applicant_last_name,
                   u.user_name AS applicant_user_name,
                   u.email AS applicant_email,
                   u.recovery_email AS applicant_recovery_email,
                   u.phone AS applicant_phone,
                   u.date_of_birth AS applicant_date_of_birth,
                   u.role AS applicant_role,
                   u.is_online AS applicant_is_online,
                   u.is_confirmed AS applicant_is_confirmed,
                   u.created_at AS applicant_created_at,
                   u.updated_at AS applicant_updated_at
            FROM applications a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.job_id = $1
            ORDER BY a.created_at
            "#,
        )
        .bind(job_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to list applications with applicants"))?;

        rows.into_iter()
            .map(|row| {
                let applicant = match (&row.applicant_email, &row.applicant_role) {
                    (Some(email), Some(role)) => {
                        let role = UserRole::from_str(role).map_err(|_| {
                            Error::validation(format!("Unknown user role '{}'", role))
                        })?;
                        Some(User {
                            id: UserId::from_string(row.user_id.clone()),
                            first_name: row.applicant_first_name.clone().unwrap_or_default(),
                            last_name: row.applicant_last_name.clone().unwrap_or_default(),
                            user_name: row.applicant_user_name.clone().unwrap_or_default(),
                            email: email.clone(),
                            recovery_email: row
                                .applicant_recovery_email
                                .clone()
                                .unwrap_or_default(),
                            phone: row.applicant_phone.clone().unwrap_or_default(),
                            date_of_birth: row
                                .applicant_date_of_birth
                                .unwrap_or(NaiveDate::MIN),
                            role,
                            is_online: row.applicant_is_online.unwrap_or(false),
                            is_confirmed: row.applicant_is_confirmed.unwrap_or(false),
                            created_at: row.applicant_created_at.unwrap_or(row.created_at),
                            updated_at: row.applicant_updated_at.unwrap_or(row.updated_at),
                        })
                    }
                    _ => None,
                };

                let application = self.row_to_application(ApplicationRow {
                    id: row.id,
                    job_id: row.job_id,
                    user_id: row.user_id,
                    user_tech_skills: row.user_tech_skills,
                    user_soft_skills: row.user_soft_skills,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })?;

                Ok((application, applicant))
            })
            .collect()
    }

    #[instrument(skip(self), fields(job_id = %job_id), name = "db_count_applications_by_job")]
    async fn count_by_job(&self, job_id: &JobId) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE job_id = $1")
                .bind(job_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|err| Error::database(err, "Failed to count applications"))?;

        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %user_id), name = "db_count_applications_by_user")]
    async fn count_by_user(&self, user_id: &UserId) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applications WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|err| Error::database(err, "Failed to count applications"))?;

        Ok(count)
    }
}
