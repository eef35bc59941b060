//! End-to-end API tests driving the full middleware chain:
//! authentication → role check → handler.

mod common;

use axum_test::TestServer;
use common::TestContext;
use serde_json::{json, Value};

fn server(ctx: &TestContext) -> TestServer {
    let state = hirelane::api::ApiState {
        user_service: ctx.user_service.clone(),
        company_service: ctx.company_service.clone(),
        job_service: ctx.job_service.clone(),
    };
    let router = hirelane::api::build_router(state, ctx.auth_service.clone());
    TestServer::new(router).expect("failed to start test server")
}

fn sign_up_body(tag: &str, role: &str) -> Value {
    json!({
        "firstName": "Test",
        "lastName": tag,
        "email": format!("{}@x.com", tag),
        "password": "correct horse battery staple",
        "recoveryEmail": format!("{}.backup@x.com", tag),
        "DOB": "1993-06-01",
        "phone": format!("+2010{:0>8}", tag.len() * 1_234_567 % 100_000_000),
        "role": role
    })
}

/// End-to-end scenario: signUp → confirm via emailed token → login →
/// addCompany as company_hr → duplicate addCompany conflicts.
#[tokio::test]
async fn sign_up_confirm_login_add_company_scenario() {
    let ctx = TestContext::new("e2e_scenario").await;
    let server = server(&ctx);

    // Sign up an HR account.
    let response = server.post("/user/signUp").json(&sign_up_body("hrlead", "company_hr")).await;
    assert_eq!(response.status_code(), 201);

    // Confirm via the emailed token.
    let token = ctx.mailer.last_confirmation_token();
    let response = server.get(&format!("/user/confirmation/{}", token)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["user"]["isConfirmed"], json!(true));

    // Login and receive a session token.
    let response = server
        .post("/user/login")
        .json(&json!({
            "email": "hrlead@x.com",
            "password": "correct horse battery staple"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let session: Value = response.json();
    let session_token = session["token"].as_str().unwrap().to_string();

    // Create a company as that identity.
    let company = json!({
        "companyName": "Initech",
        "description": "TPS report automation",
        "industry": "Software",
        "address": "Austin, TX",
        "noOfEmployees": 20,
        "companyEmail": "contact@initech.example"
    });
    let response = server
        .post("/company/addCompany")
        .authorization_bearer(&session_token)
        .json(&company)
        .await;
    assert_eq!(response.status_code(), 201);

    // A second company with the same contact email conflicts.
    let response = server
        .post("/company/addCompany")
        .authorization_bearer(&session_token)
        .json(&json!({
            "companyName": "Initech Two",
            "description": "More TPS reports",
            "industry": "Software",
            "address": "Austin, TX",
            "noOfEmployees": 10,
            "companyEmail": "contact@initech.example"
        }))
        .await;
    assert_eq!(response.status_code(), 409);
    let body: Value = response.json();
    assert_eq!(body["error"], json!("conflict"));
}

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let ctx = TestContext::new("e2e_missing_token").await;
    let server = server(&ctx);

    let response = server.get("/user/getInfo").await;
    assert_eq!(response.status_code(), 401);

    let body: Value = response.json();
    assert_eq!(body["error"], json!("unauthorized"));
}

#[tokio::test]
async fn garbage_token_is_unauthenticated() {
    let ctx = TestContext::new("e2e_garbage_token").await;
    let server = server(&ctx);

    let response =
        server.get("/user/getInfo").authorization_bearer("not-a-real-token").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthenticated() {
    let ctx = TestContext::new("e2e_deleted_user").await;
    let server = server(&ctx);

    let user = ctx
        .confirmed_user("ghost", hirelane::auth::user::UserRole::User)
        .await;
    let token = ctx.token_service.issue_session_token(&user.id).unwrap();
    ctx.user_service.delete_account(&user.id).await.unwrap();

    let response = server.get("/user/getInfo").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn role_gates_are_enforced() {
    let ctx = TestContext::new("e2e_role_gates").await;
    let server = server(&ctx);

    // A plain user may not create companies.
    let user = ctx.confirmed_user("plainuser", hirelane::auth::user::UserRole::User).await;
    let user_token = ctx.token_service.issue_session_token(&user.id).unwrap();

    let response = server
        .post("/company/addCompany")
        .authorization_bearer(&user_token)
        .json(&json!({
            "companyName": "Initech",
            "description": "TPS report automation",
            "industry": "Software",
            "address": "Austin, TX",
            "noOfEmployees": 20,
            "companyEmail": "contact@initech.example"
        }))
        .await;
    assert_eq!(response.status_code(), 403);

    // An HR user may not apply to jobs.
    let hr = ctx.confirmed_user("hronly", hirelane::auth::user::UserRole::CompanyHr).await;
    let hr_token = ctx.token_service.issue_session_token(&hr.id).unwrap();
    let job = ctx
        .job_service
        .add_job(
            &hr.id,
            hirelane::domain::CreateJobRequest {
                job_title: "Backend Engineer".to_string(),
                job_location: Default::default(),
                working_time: Default::default(),
                seniority_level: Default::default(),
                job_description: "write code".to_string(),
                technical_skills: vec![],
                soft_skills: vec![],
            },
        )
        .await
        .unwrap();

    let response = server
        .post(&format!("/job/applyToJob/{}", job.id))
        .authorization_bearer(&hr_token)
        .json(&json!({ "userTechSkills": ["rust"], "userSoftSkills": [] }))
        .await;
    assert_eq!(response.status_code(), 403);

    // Both roles can hit the shared search route.
    let response = server
        .get("/company/search")
        .add_query_param("name", "initech")
        .authorization_bearer(&user_token)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn excel_export_is_role_and_ownership_gated() {
    let ctx = TestContext::new("e2e_excel").await;
    let server = server(&ctx);

    let hr = ctx.confirmed_user("excel_hr", hirelane::auth::user::UserRole::CompanyHr).await;
    let hr_token = ctx.token_service.issue_session_token(&hr.id).unwrap();

    let company = ctx
        .company_service
        .add_company(
            &hr,
            hirelane::domain::CreateCompanyRequest {
                company_name: "Initech".to_string(),
                description: "TPS report automation".to_string(),
                industry: "Software".to_string(),
                address: "Austin, TX".to_string(),
                no_of_employees: 20,
                company_email: "contact@initech.example".to_string(),
            },
        )
        .await
        .unwrap();
    ctx.job_service
        .add_job(
            &hr.id,
            hirelane::domain::CreateJobRequest {
                job_title: "Backend Engineer".to_string(),
                job_location: Default::default(),
                working_time: Default::default(),
                seniority_level: Default::default(),
                job_description: "write code".to_string(),
                technical_skills: vec![],
                soft_skills: vec![],
            },
        )
        .await
        .unwrap();

    // Unauthenticated access is rejected outright.
    let response = server.get(&format!("/company/excel/{}", company.id)).await;
    assert_eq!(response.status_code(), 401);

    // The owner receives an xlsx attachment.
    let response = server
        .get(&format!("/company/excel/{}", company.id))
        .authorization_bearer(&hr_token)
        .await;
    assert_eq!(response.status_code(), 200);
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert_eq!(&response.as_bytes()[0..2], b"PK");
}
