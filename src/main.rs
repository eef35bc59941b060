use std::sync::Arc;

use hirelane::{
    api::{start_api_server, ApiState},
    auth::{AuthService, TokenService, UserService},
    notifications::{EmailSender, NoopEmailSender, SmtpEmailService},
    observability::init_tracing,
    services::{CompanyService, JobService},
    storage::{
        create_pool,
        repositories::{
            SqlxApplicationRepository, SqlxCompanyRepository, SqlxJobRepository,
            SqlxUserRepository,
        },
    },
    Config, Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    init_tracing();

    info!(app_name = APP_NAME, version = VERSION, "Starting Hirelane job-board backend");

    let config = Config::from_env()?;
    info!(
        api_address = %config.server.bind_address(),
        auto_migrate = config.database.auto_migrate,
        "Loaded configuration from environment"
    );

    let pool = create_pool(&config.database).await?;

    let user_repository = Arc::new(SqlxUserRepository::new(pool.clone()));
    let company_repository = Arc::new(SqlxCompanyRepository::new(pool.clone()));
    let job_repository = Arc::new(SqlxJobRepository::new(pool.clone()));
    let application_repository = Arc::new(SqlxApplicationRepository::new(pool.clone()));

    let token_service = Arc::new(TokenService::new(
        config.auth.session_secret.as_bytes(),
        config.auth.confirmation_secret.as_bytes(),
    ));

    let email_sender: Arc<dyn EmailSender> = if std::env::var("HIRELANE_MAIL_DISABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
    {
        info!("Mail dispatch disabled via HIRELANE_MAIL_DISABLED");
        Arc::new(NoopEmailSender)
    } else {
        Arc::new(SmtpEmailService::from_config(&config.mail)?)
    };

    let auth_service = Arc::new(AuthService::new(token_service.clone(), user_repository.clone()));
    let user_service = Arc::new(UserService::new(
        user_repository,
        token_service,
        email_sender,
        config.mail.public_base_url.clone(),
    ));
    let company_service = Arc::new(CompanyService::new(
        company_repository.clone(),
        job_repository.clone(),
        application_repository.clone(),
    ));
    let job_service =
        Arc::new(JobService::new(job_repository, company_repository, application_repository));

    let state = ApiState { user_service, company_service, job_service };

    start_api_server(config.server, state, auth_service).await?;

    info!("Shutdown completed");
    Ok(())
}
