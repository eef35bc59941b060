//! Job posting repository.
//!
//! CRUD and query operations for job postings, the company-annotated
//! listing, the optional multi-field filter, and the job-deletion cascade.

use crate::domain::{
    Company, CompanyId, Job, JobFilter, JobId, JobLocation, NewJob, SeniorityLevel, UpdateJob,
    UserId, WorkingTime,
};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct JobRow {
    pub id: String,
    pub title: String,
    pub location: String,
    pub working_time: String,
    pub seniority: String,
    pub description: String,
    pub technical_skills: String,
    pub soft_skills: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Left-join row for the company-annotated listing. Company columns are
/// nullable because a posting HR user may not have registered a company.
#[derive(Debug, Clone, FromRow)]
struct JobWithCompanyRow {
    pub id: String,
    pub title: String,
    pub location: String,
    pub working_time: String,
    pub seniority: String,
    pub description: String,
    pub technical_skills: String,
    pub soft_skills: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_industry: Option<String>,
    pub company_address: Option<String>,
    pub company_employee_count: Option<i64>,
    pub company_contact_email: Option<String>,
    pub company_created_at: Option<DateTime<Utc>>,
    pub company_updated_at: Option<DateTime<Utc>>,
}

const JOB_COLUMNS: &str = "id, title, location, working_time, seniority, description, \
     technical_skills, soft_skills, added_by, created_at, updated_at";

/// Count of dependent rows removed by the job-deletion cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCascadeReport {
    pub applications: u64,
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Create a new job posting
    async fn create_job(&self, job: NewJob) -> Result<Job>;

    /// Get a job by ID
    async fn get_job(&self, id: &JobId) -> Result<Option<Job>>;

    /// List all postings by an owner
    async fn list_jobs_by_owner(&self, owner: &UserId) -> Result<Vec<Job>>;

    /// Update a job's details
    async fn update_job(&self, id: &JobId, update: UpdateJob) -> Result<Job>;

    /// Delete a job together with every application referencing it.
    /// Runs as a single transaction.
    async fn delete_with_applications(&self, id: &JobId) -> Result<JobCascadeReport>;

    /// List all postings annotated with the posting HR user's company
    async fn list_jobs_with_company(&self) -> Result<Vec<(Job, Option<Company>)>>;

    /// List postings matching the optional filter; an empty filter returns
    /// everything
    async fn filter_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>>;
}

#[derive(Debug, Clone)]
pub struct SqlxJobRepository {
    pool: DbPool,
}

impl SqlxJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_job(&self, row: JobRow) -> Result<Job> {
        let location = JobLocation::from_str(&row.location)
            .map_err(|e| Error::validation(e.to_string()))?;
        let working_time = WorkingTime::from_str(&row.working_time)
            .map_err(|e| Error::validation(e.to_string()))?;
        let seniority = SeniorityLevel::from_str(&row.seniority)
            .map_err(|e| Error::validation(e.to_string()))?;
        let technical_skills: Vec<String> = serde_json::from_str(&row.technical_skills)
            .map_err(|err| Error::internal(format!("Failed to parse skills JSON: {}", err)))?;
        let soft_skills: Vec<String> = serde_json::from_str(&row.soft_skills)
            .map_err(|err| Error::internal(format!("Failed to parse skills JSON: {}", err)))?;

        Ok(Job {
            id: JobId::from_string(row.id),
            title: row.title,
            location,
            working_time,
            seniority,
            description: row.description,
            technical_skills,
            soft_skills,
            added_by: UserId::from_string(row.added_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn row_to_job_with_company(&self, row: JobWithCompanyRow) -> Result<(Job, Option<Company>)> {
        let company = match (row.company_id.clone(), row.company_name.clone()) {
            (Some(id), Some(name)) => Some(Company {
                id: CompanyId::from_string(id),
                name,
                description: row.company_description.clone().unwrap_or_default(),
                industry: row.company_industry.clone().unwrap_or_default(),
                address: row.company_address.clone().unwrap_or_default(),
                employee_count: row.company_employee_count.unwrap_or_default(),
                contact_email: row.company_contact_email.clone().unwrap_or_default(),
                company_hr: UserId::from_string(row.added_by.clone()),
                created_at: row.company_created_at.unwrap_or(row.created_at),
                updated_at: row.company_updated_at.unwrap_or(row.updated_at),
            }),
            _ => None,
        };

        let job = self.row_to_job(JobRow {
            id: row.id,
            title: row.title,
            location: row.location,
            working_time: row.working_time,
            seniority: row.seniority,
            description: row.description,
            technical_skills: row.technical_skills,
            soft_skills: row.soft_skills,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })?;

        Ok((job, company))
    }

    fn encode_skills(skills: &[String]) -> Result<String> {
        serde_json::to_string(skills)
            .map_err(|err| Error::internal(format!("Failed to serialize skills: {}", err)))
    }
}

#[async_trait]
impl JobRepository for SqlxJobRepository {
    #[instrument(skip(self, job), fields(job_title = %job.title, job_id = %job.id), name = "db_create_job")]
    async fn create_job(&self, job: NewJob) -> Result<Job> {
        let technical_skills = Self::encode_skills(&job.technical_skills)?;
        let soft_skills = Self::encode_skills(&job.soft_skills)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, location, working_time, seniority, description,
                              technical_skills, soft_skills, added_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id.as_str())
        .bind(&job.title)
        .bind(job.location.as_str())
        .bind(job.working_time.as_str())
        .bind(job.seniority.as_str())
        .bind(&job.description)
        .bind(&technical_skills)
        .bind(&soft_skills)
        .bind(job.added_by.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to create job"))?;

        self.get_job(&job.id).await?.ok_or_else(|| Error::internal("Job not found after creation"))
    }

    #[instrument(skip(self), fields(job_id = %id), name = "db_get_job")]
    async fn get_job(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch job"))?;

        row.map(|r| self.row_to_job(r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %owner), name = "db_list_jobs_by_owner")]
    async fn list_jobs_by_owner(&self, owner: &UserId) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE added_by = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to list jobs by owner"))?;

        rows.into_iter().map(|r| self.row_to_job(r)).collect()
    }

    #[instrument(skip(self, update), fields(job_id = %id), name = "db_update_job")]
    async fn update_job(&self, id: &JobId, update: UpdateJob) -> Result<Job> {
        let current =
            self.get_job(id).await?.ok_or_else(|| Error::not_found("Job", id.to_string()))?;

        let title = update.title.unwrap_or(current.title);
        let location = update.location.unwrap_or(current.location);
        let working_time = update.working_time.unwrap_or(current.working_time);
        let seniority = update.seniority.unwrap_or(current.seniority);
        let description = update.description.unwrap_or(current.description);
        let technical_skills =
            Self::encode_skills(&update.technical_skills.unwrap_or(current.technical_skills))?;
        let soft_skills = Self::encode_skills(&update.soft_skills.unwrap_or(current.soft_skills))?;

        sqlx::query(
            r#"
            UPDATE jobs
            SET title = $1, location = $2, working_time = $3, seniority = $4,
                description = $5, technical_skills = $6, soft_skills = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&title)
        .bind(location.as_str())
        .bind(working_time.as_str())
        .bind(seniority.as_str())
        .bind(&description)
        .bind(&technical_skills)
        .bind(&soft_skills)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to update job"))?;

        self.get_job(id).await?.ok_or_else(|| Error::internal("Job not found after update"))
    }

    #[instrument(skip(self), fields(job_id = %id), name = "db_delete_job_cascade")]
    async fn delete_with_applications(&self, id: &JobId) -> Result<JobCascadeReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::database(err, "Failed to start job deletion"))?;

        let applications = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete job applications"))?
            .rows_affected();

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete job"))?;

        tx.commit().await.map_err(|err| Error::database(err, "Failed to commit job deletion"))?;

        Ok(JobCascadeReport { applications })
    }

    #[instrument(skip(self), name = "db_list_jobs_with_company")]
    async fn list_jobs_with_company(&self) -> Result<Vec<(Job, Option<Company>)>> {
        let rows = sqlx::query_as::<_, JobWithCompanyRow>(
            r#"
            SELECT j.id, j.title, j.location, j.working_time, j.seniority, j.description,
                   j.technical_skills, j.soft_skills, j.added_by, j.created_at, j.updated_at,
                   c.id AS company_id,
                   c.name AS company_name,
                   c.description AS company_description,
                   c.industry AS company_industry,
                   c.address AS company_address,
                   c.employee_count AS company_employee_count,
                   c.contact_email AS company_contact_email,
                   c.created_at AS company_created_at,
                   c.updated_at AS company_updated_at
            FROM jobs j
            LEFT JOIN companies c ON c.company_hr = j.added_by
            ORDER BY j.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to list jobs with company info"))?;

        rows.into_iter().map(|r| self.row_to_job_with_company(r)).collect()
    }

    #[instrument(skip(self, filter), name = "db_filter_jobs")]
    async fn filter_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {} FROM jobs WHERE 1 = 1", JOB_COLUMNS));

        if let Some(working_time) = filter.working_time {
            builder.push(" AND working_time = ");
            builder.push_bind(working_time.as_str());
        }
        if let Some(location) = filter.location {
            builder.push(" AND location = ");
            builder.push_bind(location.as_str());
        }
        if let Some(seniority) = filter.seniority {
            builder.push(" AND seniority = ");
            builder.push_bind(seniority.as_str());
        }
        if let Some(title) = &filter.title {
            builder.push(" AND title = ");
            builder.push_bind(title.as_str());
        }
        if let Some(skills) = &filter.technical_skills {
            // Exact list match: the stored JSON array must equal the query's
            builder.push(" AND technical_skills = ");
            builder.push_bind(Self::encode_skills(skills)?);
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| Error::database(err, "Failed to filter jobs"))?;

        rows.into_iter().map(|r| self.row_to_job(r)).collect()
    }
}
