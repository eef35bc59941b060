//! Company operations: ownership-gated mutations, the deletion cascade,
//! name search, and the per-job applications listing.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::user::User;
use crate::domain::{
    Application, Company, CompanyId, CreateCompanyRequest, Job, JobId, NewCompany, UpdateCompany,
    UpdateCompanyRequest, UserId,
};
use crate::errors::{AuthErrorType, Error, Result};
use crate::observability::metrics;
use crate::services::export;
use crate::storage::repositories::{
    ApplicationRepository, CompanyCascadeReport, CompanyRepository, JobRepository,
};

/// Service for the company lifecycle.
pub struct CompanyService {
    company_repository: Arc<dyn CompanyRepository>,
    job_repository: Arc<dyn JobRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
}

impl CompanyService {
    pub fn new(
        company_repository: Arc<dyn CompanyRepository>,
        job_repository: Arc<dyn JobRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self { company_repository, job_repository, application_repository }
    }

    /// Look up a company and verify the actor owns it.
    async fn owned_company(&self, actor: &UserId, id: &CompanyId) -> Result<Company> {
        let company = self
            .company_repository
            .get_company(id)
            .await?
            .ok_or_else(|| Error::not_found("Company", id.to_string()))?;

        if !company.is_owned_by(actor) {
            warn!(user_id = %actor, company_id = %id, "company ownership check failed");
            return Err(Error::auth(
                "You are not allowed to manage this company",
                AuthErrorType::InsufficientPermissions,
            ));
        }

        Ok(company)
    }

    /// Register a new company owned by the acting HR user. Fails with a
    /// conflict when the name, contact email, or HR reference is taken.
    #[instrument(skip(self, request), fields(user_id = %hr.id, company_name = %request.company_name))]
    pub async fn add_company(&self, hr: &User, request: CreateCompanyRequest) -> Result<Company> {
        let exists = self
            .company_repository
            .conflict_exists(
                Some(&request.company_name),
                Some(&request.company_email),
                Some(&hr.id),
                None,
            )
            .await?;
        if exists {
            return Err(Error::conflict("Company already exists", "Company"));
        }

        let company = self
            .company_repository
            .create_company(NewCompany {
                id: CompanyId::new(),
                name: request.company_name,
                description: request.description,
                industry: request.industry,
                address: request.address,
                employee_count: request.no_of_employees,
                contact_email: request.company_email,
                company_hr: hr.id.clone(),
            })
            .await?;

        info!(company_id = %company.id, "company created");
        Ok(company)
    }

    /// Update a company. Requires ownership; re-checks name/email uniqueness
    /// against every other company before applying.
    #[instrument(skip(self, request), fields(user_id = %actor, company_id = %id))]
    pub async fn update_company(
        &self,
        actor: &UserId,
        id: &CompanyId,
        request: UpdateCompanyRequest,
    ) -> Result<Company> {
        let company = self.owned_company(actor, id).await?;

        if request.company_name.is_some() || request.company_email.is_some() {
            let exists = self
                .company_repository
                .conflict_exists(
                    request.company_name.as_deref(),
                    request.company_email.as_deref(),
                    None,
                    Some(&company.id),
                )
                .await?;
            if exists {
                return Err(Error::conflict("Company already exists", "Company"));
            }
        }

        self.company_repository
            .update_company(
                id,
                UpdateCompany {
                    name: request.company_name,
                    description: request.description,
                    industry: request.industry,
                    address: request.address,
                    employee_count: request.no_of_employees,
                    contact_email: request.company_email,
                },
            )
            .await
    }

    /// Delete a company. Requires ownership. Removes the HR user's postings
    /// and the applications under them in the same transaction.
    #[instrument(skip(self), fields(user_id = %actor, company_id = %id))]
    pub async fn delete_company(
        &self,
        actor: &UserId,
        id: &CompanyId,
    ) -> Result<CompanyCascadeReport> {
        let company = self.owned_company(actor, id).await?;
        let report = self.company_repository.delete_with_postings(&company).await?;

        metrics::record_cascade_delete("company", report.jobs + report.applications);
        info!(
            company_id = %id,
            jobs = report.jobs,
            applications = report.applications,
            "company deleted with dependents"
        );
        Ok(report)
    }

    /// Fetch a company and its HR user's postings. Requires ownership.
    #[instrument(skip(self), fields(user_id = %actor, company_id = %id))]
    pub async fn get_company(&self, actor: &UserId, id: &CompanyId) -> Result<(Company, Vec<Job>)> {
        let company = self.owned_company(actor, id).await?;
        let jobs = self.job_repository.list_jobs_by_owner(&company.company_hr).await?;
        Ok((company, jobs))
    }

    /// Case-insensitive substring search over company names.
    pub async fn search(&self, fragment: &str) -> Result<Vec<Company>> {
        self.company_repository.search_by_name(fragment).await
    }

    /// List applications for a job, each enriched with the applicant's user
    /// record. Requires ownership of the job.
    #[instrument(skip(self), fields(user_id = %actor, job_id = %job_id))]
    pub async fn applications_for_job(
        &self,
        actor: &UserId,
        job_id: &JobId,
    ) -> Result<Vec<(Application, Option<User>)>> {
        let job = self
            .job_repository
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::not_found("Job", job_id.to_string()))?;

        if !job.is_owned_by(actor) {
            warn!(user_id = %actor, job_id = %job_id, "job ownership check failed");
            return Err(Error::auth(
                "You are not allowed to list these applications",
                AuthErrorType::InsufficientPermissions,
            ));
        }

        self.application_repository.list_by_job_with_applicant(job_id).await
    }

    /// Build an xlsx workbook of the applications for a company's posting.
    /// Requires ownership of the company.
    #[instrument(skip(self), fields(user_id = %actor, company_id = %id))]
    pub async fn export_applications(&self, actor: &UserId, id: &CompanyId) -> Result<Vec<u8>> {
        let company = self.owned_company(actor, id).await?;

        let jobs = self.job_repository.list_jobs_by_owner(&company.company_hr).await?;
        let job = jobs
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("Job for company", id.to_string()))?;

        let applications = self.application_repository.list_by_job(&job.id).await?;
        export::applications_workbook(&applications)
    }
}
