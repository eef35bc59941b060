use axum::Router;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::users::sign_up,
        crate::api::handlers::users::confirm_email,
        crate::api::handlers::users::login,
        crate::api::handlers::users::logout,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::users::get_info,
        crate::api::handlers::users::get_by_id,
        crate::api::handlers::users::update_password,
        crate::api::handlers::users::get_by_recovery_email,
        crate::api::handlers::users::forget_password,
        crate::api::handlers::users::change_password,
        crate::api::handlers::companies::add_company,
        crate::api::handlers::companies::update_company,
        crate::api::handlers::companies::delete_company,
        crate::api::handlers::companies::get_company,
        crate::api::handlers::companies::search_companies,
        crate::api::handlers::companies::applications_for_job,
        crate::api::handlers::companies::export_applications,
        crate::api::handlers::jobs::add_job,
        crate::api::handlers::jobs::update_job,
        crate::api::handlers::jobs::delete_job,
        crate::api::handlers::jobs::apply_to_job,
        crate::api::handlers::jobs::get_jobs,
        crate::api::handlers::jobs::get_jobs_by_company_name,
        crate::api::handlers::jobs::filter_jobs
    ),
    components(
        schemas(
            crate::auth::user::SignUpRequest,
            crate::auth::user::LoginRequest,
            crate::auth::user::LoginResponse,
            crate::auth::user::UpdateUserRequest,
            crate::auth::user::UpdatePasswordRequest,
            crate::auth::user::ForgetPasswordRequest,
            crate::auth::user::ChangePasswordRequest,
            crate::auth::user::UserResponse,
            crate::auth::user::UserRole,
            crate::api::handlers::users::MessageResponse,
            crate::api::handlers::users::UserEnvelope,
            crate::api::handlers::users::UserBody,
            crate::domain::company::CreateCompanyRequest,
            crate::domain::company::UpdateCompanyRequest,
            crate::domain::company::CompanyResponse,
            crate::api::handlers::companies::CompanyEnvelope,
            crate::api::handlers::companies::CompanyWithJobsResponse,
            crate::api::handlers::companies::CompanySearchResponse,
            crate::api::handlers::companies::ApplicationsResponse,
            crate::domain::job::CreateJobRequest,
            crate::domain::job::UpdateJobRequest,
            crate::domain::job::JobResponse,
            crate::domain::job::JobWithCompanyResponse,
            crate::domain::job::JobLocation,
            crate::domain::job::WorkingTime,
            crate::domain::job::SeniorityLevel,
            crate::domain::application::Application,
            crate::domain::application::ApplyToJobRequest,
            crate::domain::application::ApplicationWithApplicantResponse,
            crate::api::handlers::jobs::JobEnvelope,
            crate::api::handlers::jobs::ApplicationEnvelope,
            crate::api::handlers::jobs::JobsWithCompanyResponse,
            crate::api::handlers::jobs::JobsResponse
        )
    ),
    tags(
        (name = "users", description = "Account lifecycle, login, and password recovery"),
        (name = "companies", description = "Company management and applications listings"),
        (name = "jobs", description = "Job postings, applications, and search")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn docs_router() -> Router {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_includes_all_endpoints() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/user/signUp",
            "/user/confirmation/{confirmationToken}",
            "/user/login",
            "/user/logout",
            "/user/update",
            "/user/delete",
            "/user/getInfo",
            "/user/getById/{id}",
            "/user/updatePass",
            "/user/recoveryEmail",
            "/user/forgetPass",
            "/user/changePass",
            "/company/addCompany",
            "/company/updateCompany/{id}",
            "/company/deleteCompany/{id}",
            "/company/getCompany/{id}",
            "/company/search",
            "/company/find",
            "/company/excel/{id}",
            "/job/addJob",
            "/job/update/{id}",
            "/job/delete/{id}",
            "/job/applyToJob/{id}",
            "/job/getJobs",
            "/job/getJobsByCompanyName",
            "/job/filter",
        ] {
            assert!(paths.contains_key(path), "Missing {}", path);
        }
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
