//! Job application domain models and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::user::UserResponse;
use crate::domain::{ApplicationId, JobId, UserId};

/// Stored representation of a job application. Skill lists are a snapshot of
/// the applicant's skills at application time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub user_tech_skills: Vec<String>,
    pub user_soft_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New application database payload.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub user_tech_skills: Vec<String>,
    pub user_soft_skills: Vec<String>,
}

/// Request body for applying to a job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyToJobRequest {
    #[serde(default)]
    pub user_tech_skills: Vec<String>,
    #[serde(default)]
    pub user_soft_skills: Vec<String>,
}

/// An application enriched with the applicant's user record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithApplicantResponse {
    #[serde(flatten)]
    pub application: Application,
    pub applicant: Option<UserResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_request_defaults_to_empty_skill_lists() {
        let request: ApplyToJobRequest = serde_json::from_str("{}").unwrap();
        assert!(request.user_tech_skills.is_empty());
        assert!(request.user_soft_skills.is_empty());
    }

    #[test]
    fn application_serializes_skill_snapshot() {
        let application = Application {
            id: ApplicationId::new(),
            job_id: JobId::new(),
            user_id: UserId::new(),
            user_tech_skills: vec!["rust".to_string(), "sql".to_string()],
            user_soft_skills: vec!["communication".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&application).unwrap();
        assert!(json.contains("userTechSkills"));
        assert!(json.contains("userSoftSkills"));
    }
}
