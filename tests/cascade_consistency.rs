//! Integration tests for the cascade-consistency delete plans across
//! Company → Job → Application.

mod common;

use common::TestContext;
use hirelane::auth::user::UserRole;
use hirelane::domain::{ApplyToJobRequest, CreateCompanyRequest, CreateJobRequest};
use hirelane::storage::repositories::{ApplicationRepository, CompanyRepository, JobRepository};

fn company_request(name: &str, email: &str) -> CreateCompanyRequest {
    CreateCompanyRequest {
        company_name: name.to_string(),
        description: "builds things".to_string(),
        industry: "Software".to_string(),
        address: "Cairo".to_string(),
        no_of_employees: 12,
        company_email: email.to_string(),
    }
}

fn job_request(title: &str) -> CreateJobRequest {
    CreateJobRequest {
        job_title: title.to_string(),
        job_location: Default::default(),
        working_time: Default::default(),
        seniority_level: Default::default(),
        job_description: "write code".to_string(),
        technical_skills: vec!["rust".to_string()],
        soft_skills: vec![],
    }
}

fn apply_request() -> ApplyToJobRequest {
    ApplyToJobRequest {
        user_tech_skills: vec!["rust".to_string()],
        user_soft_skills: vec!["communication".to_string()],
    }
}

#[tokio::test]
async fn deleting_a_job_removes_its_applications() {
    let ctx = TestContext::new("job_cascade").await;
    let hr = ctx.confirmed_user("hr_job_cascade", UserRole::CompanyHr).await;
    let applicant_a = ctx.confirmed_user("applicant_a", UserRole::User).await;
    let applicant_b = ctx.confirmed_user("applicant_b", UserRole::User).await;

    let job = ctx.job_service.add_job(&hr.id, job_request("Backend Engineer")).await.unwrap();
    ctx.job_service.apply_to_job(&applicant_a.id, &job.id, apply_request()).await.unwrap();
    ctx.job_service.apply_to_job(&applicant_b.id, &job.id, apply_request()).await.unwrap();

    assert_eq!(ctx.application_repository.count_by_job(&job.id).await.unwrap(), 2);

    let report = ctx.job_service.delete_job(&hr.id, &job.id).await.unwrap();
    assert_eq!(report.applications, 2);

    // Post-condition: zero applications reference the job, the job is gone.
    assert_eq!(ctx.application_repository.count_by_job(&job.id).await.unwrap(), 0);
    assert!(ctx.job_repository.get_job(&job.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_company_removes_its_jobs_and_their_applications() {
    let ctx = TestContext::new("company_cascade").await;
    let hr = ctx.confirmed_user("hr_company_cascade", UserRole::CompanyHr).await;
    let applicant = ctx.confirmed_user("applicant_c", UserRole::User).await;

    let company = ctx
        .company_service
        .add_company(&hr, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();

    let job_a = ctx.job_service.add_job(&hr.id, job_request("Backend Engineer")).await.unwrap();
    let job_b = ctx.job_service.add_job(&hr.id, job_request("Data Engineer")).await.unwrap();
    ctx.job_service.apply_to_job(&applicant.id, &job_a.id, apply_request()).await.unwrap();
    ctx.job_service.apply_to_job(&applicant.id, &job_b.id, apply_request()).await.unwrap();

    let report = ctx.company_service.delete_company(&hr.id, &company.id).await.unwrap();
    assert_eq!(report.jobs, 2);
    assert_eq!(report.applications, 2);

    // No job owned by the company's HR reference remains queryable.
    assert!(ctx.job_repository.list_jobs_by_owner(&hr.id).await.unwrap().is_empty());
    assert_eq!(ctx.application_repository.count_by_job(&job_a.id).await.unwrap(), 0);
    assert_eq!(ctx.application_repository.count_by_job(&job_b.id).await.unwrap(), 0);
    assert!(ctx.company_repository.get_company(&company.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_user_removes_companies_jobs_and_applications() {
    let ctx = TestContext::new("user_cascade").await;
    let hr = ctx.confirmed_user("hr_user_cascade", UserRole::CompanyHr).await;
    let other_hr = ctx.confirmed_user("hr_bystander", UserRole::CompanyHr).await;
    let applicant = ctx.confirmed_user("applicant_d", UserRole::User).await;

    // The HR user owns a company and two postings with one application each.
    ctx.company_service
        .add_company(&hr, company_request("Globex", "contact@globex.example"))
        .await
        .unwrap();
    let owned_job =
        ctx.job_service.add_job(&hr.id, job_request("Backend Engineer")).await.unwrap();
    ctx.job_service.apply_to_job(&applicant.id, &owned_job.id, apply_request()).await.unwrap();

    // A bystander HR user's posting, with an application from the same
    // applicant, must survive the cascade.
    let bystander_job =
        ctx.job_service.add_job(&other_hr.id, job_request("Platform Engineer")).await.unwrap();
    ctx.job_service
        .apply_to_job(&applicant.id, &bystander_job.id, apply_request())
        .await
        .unwrap();

    // Deleting the HR user sweeps the company, the owned posting, and the
    // application under it.
    let report = ctx.user_service.delete_account(&hr.id).await.unwrap();
    assert_eq!(report.companies, 1);
    assert_eq!(report.jobs, 1);
    assert_eq!(report.applications, 1);

    assert!(ctx.company_repository.get_company_by_hr(&hr.id).await.unwrap().is_none());
    assert!(ctx.job_repository.get_job(&owned_job.id).await.unwrap().is_none());
    assert_eq!(ctx.application_repository.count_by_job(&owned_job.id).await.unwrap(), 0);

    // The bystander's posting and its application are untouched.
    assert!(ctx.job_repository.get_job(&bystander_job.id).await.unwrap().is_some());
    assert_eq!(ctx.application_repository.count_by_job(&bystander_job.id).await.unwrap(), 1);

    // Deleting the applicant sweeps their remaining application.
    let applicant_report = ctx.user_service.delete_account(&applicant.id).await.unwrap();
    assert_eq!(applicant_report.companies, 0);
    assert_eq!(applicant_report.jobs, 0);
    assert_eq!(applicant_report.applications, 1);
    assert_eq!(ctx.application_repository.count_by_user(&applicant.id).await.unwrap(), 0);
}
