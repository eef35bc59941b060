//! Integration tests for the ownership-gated mutation pattern and the
//! uniqueness constraints on companies.

mod common;

use common::TestContext;
use hirelane::auth::user::UserRole;
use hirelane::domain::{CreateCompanyRequest, CreateJobRequest, UpdateCompanyRequest, UpdateJobRequest};
use hirelane::errors::{AuthErrorType, Error};
use hirelane::storage::repositories::{CompanyRepository, JobRepository};

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
        technical_skills: vec![],
        soft_skills: vec![],
    }
}

fn is_forbidden(err: &Error) -> bool {
    matches!(
        err,
        Error::Auth { error_type: AuthErrorType::InsufficientPermissions, .. }
    )
}

#[tokio::test]
async fn company_mutations_require_ownership() {
    let ctx = TestContext::new("company_ownership").await;
    let owner = ctx.confirmed_user("owner_hr", UserRole::CompanyHr).await;
    let intruder = ctx.confirmed_user("intruder_hr", UserRole::CompanyHr).await;

    let company = ctx
        .company_service
        .add_company(&owner, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();

    // Update by a non-owner is rejected and the entity is unchanged.
    let update = ctx
        .company_service
        .update_company(
            &intruder.id,
            &company.id,
            UpdateCompanyRequest {
                company_name: Some("Hijacked".to_string()),
                description: None,
                industry: None,
                address: None,
                no_of_employees: None,
                company_email: None,
            },
        )
        .await;
    assert!(is_forbidden(&update.unwrap_err()));

    let unchanged = ctx.company_repository.get_company(&company.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "Initech");

    // Delete by a non-owner is rejected and the entity survives.
    let delete = ctx.company_service.delete_company(&intruder.id, &company.id).await;
    assert!(is_forbidden(&delete.unwrap_err()));
    assert!(ctx.company_repository.get_company(&company.id).await.unwrap().is_some());

    // Reads of another HR user's company are rejected too.
    let read = ctx.company_service.get_company(&intruder.id, &company.id).await;
    assert!(is_forbidden(&read.unwrap_err()));
}

#[tokio::test]
async fn job_mutations_require_ownership() {
    let ctx = TestContext::new("job_ownership").await;
    let owner = ctx.confirmed_user("owner_hr2", UserRole::CompanyHr).await;
    let intruder = ctx.confirmed_user("intruder_hr2", UserRole::CompanyHr).await;

    let job = ctx.job_service.add_job(&owner.id, job_request("Backend Engineer")).await.unwrap();

    let update = ctx
        .job_service
        .update_job(
            &intruder.id,
            &job.id,
            UpdateJobRequest {
                job_title: Some("Hijacked".to_string()),
                job_location: None,
                working_time: None,
                seniority_level: None,
                job_description: None,
                technical_skills: None,
                soft_skills: None,
            },
        )
        .await;
    assert!(is_forbidden(&update.unwrap_err()));

    let delete = ctx.job_service.delete_job(&intruder.id, &job.id).await;
    assert!(is_forbidden(&delete.unwrap_err()));

    let unchanged = ctx.job_repository.get_job(&job.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Backend Engineer");
}

#[tokio::test]
async fn company_uniqueness_is_enforced_on_create() {
    let ctx = TestContext::new("company_uniqueness").await;
    let hr_a = ctx.confirmed_user("unique_hr_a", UserRole::CompanyHr).await;
    let hr_b = ctx.confirmed_user("unique_hr_b", UserRole::CompanyHr).await;

    ctx.company_service
        .add_company(&hr_a, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();

    // Same name.
    let same_name = ctx
        .company_service
        .add_company(&hr_b, company_request("Initech", "other@initech.example"))
        .await;
    assert!(matches!(same_name, Err(Error::Conflict { .. })));

    // Same contact email.
    let same_email = ctx
        .company_service
        .add_company(&hr_b, company_request("Other Corp", "contact@initech.example"))
        .await;
    assert!(matches!(same_email, Err(Error::Conflict { .. })));

    // Same HR reference: one company per HR user.
    let second_company = ctx
        .company_service
        .add_company(&hr_a, company_request("Second Venture", "second@venture.example"))
        .await;
    assert!(matches!(second_company, Err(Error::Conflict { .. })));

    // No extra document was persisted by the failed attempts.
    assert!(ctx.company_repository.get_company_by_name("Other Corp").await.unwrap().is_none());
    assert!(ctx
        .company_repository
        .get_company_by_name("Second Venture")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn company_update_cannot_rename_into_collision() {
    let ctx = TestContext::new("company_rename_collision").await;
    let hr_a = ctx.confirmed_user("rename_hr_a", UserRole::CompanyHr).await;
    let hr_b = ctx.confirmed_user("rename_hr_b", UserRole::CompanyHr).await;

    ctx.company_service
        .add_company(&hr_a, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();
    let target = ctx
        .company_service
        .add_company(&hr_b, company_request("Globex", "contact@globex.example"))
        .await
        .unwrap();

    let rename = ctx
        .company_service
        .update_company(
            &hr_b.id,
            &target.id,
            UpdateCompanyRequest {
                company_name: Some("Initech".to_string()),
                description: None,
                industry: None,
                address: None,
                no_of_employees: None,
                company_email: None,
            },
        )
        .await;
    assert!(matches!(rename, Err(Error::Conflict { .. })));
}

#[tokio::test]
async fn applications_listing_requires_job_ownership() {
    let ctx = TestContext::new("applications_ownership").await;
    let owner = ctx.confirmed_user("apps_owner", UserRole::CompanyHr).await;
    let intruder = ctx.confirmed_user("apps_intruder", UserRole::CompanyHr).await;

    let job = ctx.job_service.add_job(&owner.id, job_request("Backend Engineer")).await.unwrap();

    let listing = ctx.company_service.applications_for_job(&intruder.id, &job.id).await;
    assert!(is_forbidden(&listing.unwrap_err()));

    let own_listing = ctx.company_service.applications_for_job(&owner.id, &job.id).await;
    assert!(own_listing.is_ok());
}

#[tokio::test]
async fn export_requires_company_ownership() {
    let ctx = TestContext::new("export_ownership").await;
    let owner = ctx.confirmed_user("export_owner", UserRole::CompanyHr).await;
    let intruder = ctx.confirmed_user("export_intruder", UserRole::CompanyHr).await;

    let company = ctx
        .company_service
        .add_company(&owner, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();
    ctx.job_service.add_job(&owner.id, job_request("Backend Engineer")).await.unwrap();

    let stolen = ctx.company_service.export_applications(&intruder.id, &company.id).await;
    assert!(is_forbidden(&stolen.unwrap_err()));

    let workbook = ctx.company_service.export_applications(&owner.id, &company.id).await.unwrap();
    assert_eq!(&workbook[0..2], b"PK");
}

#[tokio::test]
async fn export_without_postings_is_not_found() {
    let ctx = TestContext::new("export_no_jobs").await;
    let owner = ctx.confirmed_user("export_empty", UserRole::CompanyHr).await;

    let company = ctx
        .company_service
        .add_company(&owner, company_request("Initech", "contact@initech.example"))
        .await
        .unwrap();

    let result = ctx.company_service.export_applications(&owner.id, &company.id).await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}
