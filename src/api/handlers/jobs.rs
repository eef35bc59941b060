//! Job posting API handlers.

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
use crate::api::handlers::users::MessageResponse;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::domain::{
    Application, ApplyToJobRequest, CreateJobRequest, JobFilter, JobId, JobLocation, JobResponse,
    JobWithCompanyResponse, SeniorityLevel, UpdateJobRequest, WorkingTime,
};

/// Message plus job response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobEnvelope {
    pub message: String,
    pub job: JobResponse,
}

/// Message plus application response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplicationEnvelope {
    pub message: String,
    pub application: Application,
}

/// Jobs listing annotated with company info.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobsWithCompanyResponse {
    pub all_jobs: Vec<JobWithCompanyResponse>,
}

/// Plain jobs listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    pub all_jobs: Vec<JobResponse>,
}

/// Query parameters for the by-company-name listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNameQuery {
    pub company_name: String,
}

/// Optional filter query. Absent fields are not filtered on;
/// `technicalSkills` is a comma-separated list matched exactly.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct JobFilterQuery {
    pub working_time: Option<WorkingTime>,
    pub job_location: Option<JobLocation>,
    pub seniority_level: Option<SeniorityLevel>,
    pub job_title: Option<String>,
    pub technical_skills: Option<String>,
}

impl From<JobFilterQuery> for JobFilter {
    fn from(query: JobFilterQuery) -> Self {
        JobFilter {
            working_time: query.working_time,
            location: query.job_location,
            seniority: query.seniority_level,
            title: query.job_title,
            technical_skills: query.technical_skills.map(|skills| {
                skills.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
            }),
        }
    }
}

/// Create a job posting owned by the authenticated HR user.
#[utoipa::path(
    post,
    path = "/job/addJob",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = JobEnvelope),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Requires the company_hr role")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id(), job_title = %payload.job_title))]
pub async fn add_job(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobEnvelope>), ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job = state.job_service.add_job(context.user_id(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(JobEnvelope { message: "job created".to_string(), job: job.into() }),
    ))
}

/// Update a job posting. Only its owner may do this.
#[utoipa::path(
    put,
    path = "/job/update/{id}",
    params(("id" = String, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobEnvelope),
        (status = 403, description = "Not the posting owner"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id(), job_id = %id))]
pub async fn update_job(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<JobEnvelope>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job =
        state.job_service.update_job(context.user_id(), &JobId::from_string(id), payload).await?;

    Ok(Json(JobEnvelope { message: "updated".to_string(), job: job.into() }))
}

/// Delete a job posting and its applications.
#[utoipa::path(
    delete,
    path = "/job/delete/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted with applications", body = MessageResponse),
        (status = 403, description = "Not the posting owner"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state), fields(user_id = %context.user_id(), job_id = %id))]
pub async fn delete_job(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.job_service.delete_job(context.user_id(), &JobId::from_string(id)).await?;

    Ok(Json(MessageResponse { message: "deleted".to_string() }))
}

/// Apply to an existing job as a plain user.
#[utoipa::path(
    post,
    path = "/job/applyToJob/{id}",
    params(("id" = String, Path, description = "Job ID")),
    request_body = ApplyToJobRequest,
    responses(
        (status = 201, description = "Application filed", body = ApplicationEnvelope),
        (status = 403, description = "Requires the user role"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id(), job_id = %id))]
pub async fn apply_to_job(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<ApplyToJobRequest>,
) -> Result<(StatusCode, Json<ApplicationEnvelope>), ApiError> {
    let application = state
        .job_service
        .apply_to_job(context.user_id(), &JobId::from_string(id), payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationEnvelope { message: "applied successfully".to_string(), application }),
    ))
}

/// List all postings annotated with the posting HR user's company.
#[utoipa::path(
    get,
    path = "/job/getJobs",
    responses(
        (status = 200, description = "Jobs with company info", body = JobsWithCompanyResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state))]
pub async fn get_jobs(
    State(state): State<ApiState>,
) -> Result<Json<JobsWithCompanyResponse>, ApiError> {
    let jobs = state.job_service.jobs_with_company().await?;

    Ok(Json(JobsWithCompanyResponse {
        all_jobs: jobs
            .into_iter()
            .map(|(job, company)| JobWithCompanyResponse {
                job: job.into(),
                company_info: company.map(|company| company.into()),
            })
            .collect(),
    }))
}

/// List the postings of the company with the given name.
#[utoipa::path(
    get,
    path = "/job/getJobsByCompanyName",
    params(CompanyNameQuery),
    responses(
        (status = 200, description = "The company's postings", body = JobsResponse),
        (status = 404, description = "Company does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state, query), fields(company_name = %query.company_name))]
pub async fn get_jobs_by_company_name(
    State(state): State<ApiState>,
    Query(query): Query<CompanyNameQuery>,
) -> Result<Json<JobsResponse>, ApiError> {
    let jobs = state.job_service.jobs_by_company_name(&query.company_name).await?;

    Ok(Json(JobsResponse { all_jobs: jobs.into_iter().map(|job| job.into()).collect() }))
}

/// List postings matching the optional filter.
#[utoipa::path(
    get,
    path = "/job/filter",
    params(JobFilterQuery),
    responses(
        (status = 200, description = "Matching postings", body = JobsResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "jobs"
)]
#[instrument(skip(state, query))]
pub async fn filter_jobs(
    State(state): State<ApiState>,
    Query(query): Query<JobFilterQuery>,
) -> Result<Json<JobsResponse>, ApiError> {
    let filter: JobFilter = query.into();
    let jobs = state.job_service.filter_jobs(&filter).await?;

    Ok(Json(JobsResponse { all_jobs: jobs.into_iter().map(|job| job.into()).collect() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_splits_comma_separated_skills() {
        let query = JobFilterQuery {
            technical_skills: Some("rust, sql,,tokio ".to_string()),
            ..Default::default()
        };
        let filter: JobFilter = query.into();

        assert_eq!(
            filter.technical_skills,
            Some(vec!["rust".to_string(), "sql".to_string(), "tokio".to_string()])
        );
    }

    #[test]
    fn empty_filter_query_yields_empty_filter() {
        let filter: JobFilter = JobFilterQuery::default().into();
        assert!(filter.is_empty());
    }
}
