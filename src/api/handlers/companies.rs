//! Company API handlers. Mutating routes are restricted to the company_hr
//! role by the router; ownership is enforced per entity in the service.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
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
    ApplicationWithApplicantResponse, CompanyId, CompanyResponse, CreateCompanyRequest, JobId,
    JobResponse, UpdateCompanyRequest,
};
use crate::services::export;

/// Message plus company response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyEnvelope {
    pub message: String,
    pub company: CompanyResponse,
}

/// A company together with its HR user's postings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithJobsResponse {
    pub company: CompanyResponse,
    pub company_jobs: Vec<JobResponse>,
}

/// Company search results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanySearchResponse {
    pub companies: Vec<CompanyResponse>,
}

/// Applications listing for a job.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsResponse {
    pub all_applications: Vec<ApplicationWithApplicantResponse>,
}

/// Query parameters for the company name search.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CompanySearchQuery {
    pub name: String,
}

/// Query parameters for the applications listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationsQuery {
    pub job_id: String,
}

/// Register a company owned by the authenticated HR user.
#[utoipa::path(
    post,
    path = "/company/addCompany",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyEnvelope),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Requires the company_hr role"),
        (status = 409, description = "Name, email, or HR reference already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id(), company_name = %payload.company_name))]
pub async fn add_company(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyEnvelope>), ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let company = state.company_service.add_company(&context.user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CompanyEnvelope { message: "company created".to_string(), company: company.into() }),
    ))
}

/// Update a company. Only its owning HR user may do this.
#[utoipa::path(
    put,
    path = "/company/updateCompany/{id}",
    params(("id" = String, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = CompanyEnvelope),
        (status = 403, description = "Not the owning HR user"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Name or email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, payload), fields(user_id = %context.user_id(), company_id = %id))]
pub async fn update_company(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyEnvelope>, ApiError> {
    payload.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let company = state
        .company_service
        .update_company(context.user_id(), &CompanyId::from_string(id), payload)
        .await?;

    Ok(Json(CompanyEnvelope { message: "updated".to_string(), company: company.into() }))
}

/// Delete a company and its dependent postings/applications.
#[utoipa::path(
    delete,
    path = "/company/deleteCompany/{id}",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted with dependents", body = MessageResponse),
        (status = 403, description = "Not the owning HR user"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state), fields(user_id = %context.user_id(), company_id = %id))]
pub async fn delete_company(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.company_service.delete_company(context.user_id(), &CompanyId::from_string(id)).await?;

    Ok(Json(MessageResponse { message: "deleted".to_string() }))
}

/// Fetch a company and its postings. Only its owning HR user may do this.
#[utoipa::path(
    get,
    path = "/company/getCompany/{id}",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company with its postings", body = CompanyWithJobsResponse),
        (status = 403, description = "Not the owning HR user"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state), fields(user_id = %context.user_id(), company_id = %id))]
pub async fn get_company(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<CompanyWithJobsResponse>, ApiError> {
    let (company, jobs) =
        state.company_service.get_company(context.user_id(), &CompanyId::from_string(id)).await?;

    Ok(Json(CompanyWithJobsResponse {
        company: company.into(),
        company_jobs: jobs.into_iter().map(|job| job.into()).collect(),
    }))
}

/// Case-insensitive substring search over company names.
#[utoipa::path(
    get,
    path = "/company/search",
    params(CompanySearchQuery),
    responses(
        (status = 200, description = "Matching companies", body = CompanySearchResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, query), fields(fragment = %query.name))]
pub async fn search_companies(
    State(state): State<ApiState>,
    Query(query): Query<CompanySearchQuery>,
) -> Result<Json<CompanySearchResponse>, ApiError> {
    let companies = state.company_service.search(&query.name).await?;

    Ok(Json(CompanySearchResponse {
        companies: companies.into_iter().map(|company| company.into()).collect(),
    }))
}

/// List applications for one of the authenticated HR user's postings, each
/// enriched with the applicant's user record.
#[utoipa::path(
    get,
    path = "/company/find",
    params(ApplicationsQuery),
    responses(
        (status = 200, description = "Applications for the job", body = ApplicationsResponse),
        (status = 403, description = "Not the posting owner"),
        (status = 404, description = "Job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, query), fields(user_id = %context.user_id(), job_id = %query.job_id))]
pub async fn applications_for_job(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<Json<ApplicationsResponse>, ApiError> {
    let applications = state
        .company_service
        .applications_for_job(context.user_id(), &JobId::from_string(query.job_id))
        .await?;

    Ok(Json(ApplicationsResponse {
        all_applications: applications
            .into_iter()
            .map(|(application, applicant)| ApplicationWithApplicantResponse {
                application,
                applicant: applicant.map(|user| user.into()),
            })
            .collect(),
    }))
}

/// Stream an xlsx attachment of the applications for a company's posting.
/// Requires the company_hr role and company ownership.
#[utoipa::path(
    get,
    path = "/company/excel/{id}",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "xlsx attachment"),
        (status = 403, description = "Not the owning HR user"),
        (status = 404, description = "Company or job not found")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state), fields(user_id = %context.user_id(), company_id = %id))]
pub async fn export_applications(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let buffer = state
        .company_service
        .export_applications(context.user_id(), &CompanyId::from_string(id))
        .await?;

    let headers = [
        (header::CONTENT_TYPE, export::XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment;filename={}", export::XLSX_FILENAME),
        ),
    ];

    Ok((headers, buffer).into_response())
}
