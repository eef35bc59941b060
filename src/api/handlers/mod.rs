//! HTTP handlers, grouped by entity.

pub mod companies;
pub mod jobs;
pub mod users;

pub use companies::{
    add_company, applications_for_job, delete_company, export_applications, get_company,
    search_companies, update_company,
};
pub use jobs::{
    add_job, apply_to_job, delete_job, filter_jobs, get_jobs, get_jobs_by_company_name, update_job,
};
pub use users::{
    change_password, confirm_email, delete_user, forget_password, get_by_id,
    get_by_recovery_email, get_info, login, logout, sign_up, update_password, update_user,
};
