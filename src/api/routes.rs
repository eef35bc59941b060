use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::auth::{
    auth_service::AuthService,
    middleware::{authenticate, require_roles, RoleState},
    user::UserRole,
    UserService,
};
use crate::services::{CompanyService, JobService};

use super::{docs, handlers};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub user_service: Arc<UserService>,
    pub company_service: Arc<CompanyService>,
    pub job_service: Arc<JobService>,
}

/// Build the full application router: public account routes, then the
/// authenticated routes wrapped in the authentication layer with per-group
/// role layers.
pub fn build_router(state: ApiState, auth_service: Arc<AuthService>) -> Router {
    let auth_layer = middleware::from_fn_with_state(auth_service, authenticate);

    let role_layer = |roles: Vec<UserRole>| {
        let allowed: RoleState = Arc::new(roles);
        middleware::from_fn_with_state(allowed, require_roles)
    };

    let public = Router::new()
        .route("/user/signUp", post(handlers::sign_up))
        .route("/user/confirmation/{confirmationToken}", get(handlers::confirm_email))
        .route("/user/login", post(handlers::login))
        .route("/user/forgetPass", post(handlers::forget_password))
        .route("/user/changePass", patch(handlers::change_password))
        .with_state(state.clone());

    // Session-only routes: any authenticated role.
    let session = Router::new()
        .route("/user/logout", patch(handlers::logout))
        .route("/user/update", put(handlers::update_user))
        .route("/user/delete", delete(handlers::delete_user))
        .route("/user/getInfo", get(handlers::get_info))
        .route("/user/getById/{id}", get(handlers::get_by_id))
        .route("/user/updatePass", patch(handlers::update_password))
        .route("/user/recoveryEmail", get(handlers::get_by_recovery_email));

    // Routes restricted to HR users.
    let hr_only = Router::new()
        .route("/company/addCompany", post(handlers::add_company))
        .route("/company/updateCompany/{id}", put(handlers::update_company))
        .route("/company/deleteCompany/{id}", delete(handlers::delete_company))
        .route("/company/getCompany/{id}", get(handlers::get_company))
        .route("/company/find", get(handlers::applications_for_job))
        .route("/company/excel/{id}", get(handlers::export_applications))
        .route("/job/addJob", post(handlers::add_job))
        .route("/job/update/{id}", put(handlers::update_job))
        .route("/job/delete/{id}", delete(handlers::delete_job))
        .route_layer(role_layer(vec![UserRole::CompanyHr]));

    // Routes restricted to plain users.
    let user_only = Router::new()
        .route("/job/applyToJob/{id}", post(handlers::apply_to_job))
        .route_layer(role_layer(vec![UserRole::User]));

    // Routes open to both roles.
    let shared = Router::new()
        .route("/company/search", get(handlers::search_companies))
        .route("/job/getJobs", get(handlers::get_jobs))
        .route("/job/getJobsByCompanyName", get(handlers::get_jobs_by_company_name))
        .route("/job/filter", get(handlers::filter_jobs))
        .route_layer(role_layer(vec![UserRole::User, UserRole::CompanyHr]));

    let secured = Router::new()
        .merge(session)
        .merge(hr_only)
        .merge(user_only)
        .merge(shared)
        .with_state(state)
        .layer(auth_layer);

    public.merge(secured).merge(docs::docs_router())
}
