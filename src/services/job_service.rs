//! Job posting operations: ownership-gated mutations, the deletion cascade,
//! applications, and the read/filter queries.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::{
    Application, ApplicationId, ApplyToJobRequest, Company, CreateJobRequest, Job, JobFilter,
    JobId, NewApplication, NewJob, UpdateJob, UpdateJobRequest, UserId,
};
use crate::errors::{AuthErrorType, Error, Result};
use crate::observability::metrics;
use crate::storage::repositories::{
    ApplicationRepository, CompanyRepository, JobCascadeReport, JobRepository,
};

/// Service for the job posting lifecycle.
pub struct JobService {
    job_repository: Arc<dyn JobRepository>,
    company_repository: Arc<dyn CompanyRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
}

impl JobService {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        company_repository: Arc<dyn CompanyRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self { job_repository, company_repository, application_repository }
    }

    /// Look up a job and verify the actor owns it.
    async fn owned_job(&self, actor: &UserId, id: &JobId) -> Result<Job> {
        let job = self
            .job_repository
            .get_job(id)
            .await?
            .ok_or_else(|| Error::not_found("Job", id.to_string()))?;

        if !job.is_owned_by(actor) {
            warn!(user_id = %actor, job_id = %id, "job ownership check failed");
            return Err(Error::auth(
                "You are not allowed to manage this job",
                AuthErrorType::InsufficientPermissions,
            ));
        }

        Ok(job)
    }

    /// Create a job posting owned by the acting HR user.
    #[instrument(skip(self, request), fields(user_id = %owner, job_title = %request.job_title))]
    pub async fn add_job(&self, owner: &UserId, request: CreateJobRequest) -> Result<Job> {
        let job = self
            .job_repository
            .create_job(NewJob {
                id: JobId::new(),
                title: request.job_title,
                location: request.job_location,
                working_time: request.working_time,
                seniority: request.seniority_level,
                description: request.job_description,
                technical_skills: request.technical_skills,
                soft_skills: request.soft_skills,
                added_by: owner.clone(),
            })
            .await?;

        info!(job_id = %job.id, "job created");
        Ok(job)
    }

    /// Update a job posting. Requires ownership.
    #[instrument(skip(self, request), fields(user_id = %actor, job_id = %id))]
    pub async fn update_job(
        &self,
        actor: &UserId,
        id: &JobId,
        request: UpdateJobRequest,
    ) -> Result<Job> {
        self.owned_job(actor, id).await?;

        self.job_repository
            .update_job(
                id,
                UpdateJob {
                    title: request.job_title,
                    location: request.job_location,
                    working_time: request.working_time,
                    seniority: request.seniority_level,
                    description: request.job_description,
                    technical_skills: request.technical_skills,
                    soft_skills: request.soft_skills,
                },
            )
            .await
    }

    /// Delete a job posting and every application referencing it, in one
    /// transaction. Requires ownership.
    #[instrument(skip(self), fields(user_id = %actor, job_id = %id))]
    pub async fn delete_job(&self, actor: &UserId, id: &JobId) -> Result<JobCascadeReport> {
        self.owned_job(actor, id).await?;
        let report = self.job_repository.delete_with_applications(id).await?;

        metrics::record_cascade_delete("job", report.applications);
        info!(job_id = %id, applications = report.applications, "job deleted with applications");
        Ok(report)
    }

    /// Apply to an existing job, snapshotting the applicant's skills.
    #[instrument(skip(self, request), fields(user_id = %applicant, job_id = %job_id))]
    pub async fn apply_to_job(
        &self,
        applicant: &UserId,
        job_id: &JobId,
        request: ApplyToJobRequest,
    ) -> Result<Application> {
        // The posting must exist at write time.
        self.job_repository
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::not_found("Job", job_id.to_string()))?;

        let application = self
            .application_repository
            .create_application(NewApplication {
                id: ApplicationId::new(),
                job_id: job_id.clone(),
                user_id: applicant.clone(),
                user_tech_skills: request.user_tech_skills,
                user_soft_skills: request.user_soft_skills,
            })
            .await?;

        info!(application_id = %application.id, "application filed");
        Ok(application)
    }

    /// List all postings annotated with the posting HR user's company.
    pub async fn jobs_with_company(&self) -> Result<Vec<(Job, Option<Company>)>> {
        self.job_repository.list_jobs_with_company().await
    }

    /// List the postings of the company with the given name.
    #[instrument(skip(self), fields(company_name = %company_name))]
    pub async fn jobs_by_company_name(&self, company_name: &str) -> Result<Vec<Job>> {
        let company = self
            .company_repository
            .get_company_by_name(company_name)
            .await?
            .ok_or_else(|| Error::not_found("Company", company_name.to_string()))?;

        self.job_repository.list_jobs_by_owner(&company.company_hr).await
    }

    /// List postings matching the optional filter. An empty filter returns
    /// every posting.
    pub async fn filter_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        self.job_repository.filter_jobs(filter).await
    }
}
