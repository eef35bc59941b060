//! Job posting domain models and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::company::CompanyResponse;
use crate::domain::{JobId, UserId};

/// Where the work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum JobLocation {
    #[serde(rename = "onsite")]
    Onsite,
    #[serde(rename = "remotely")]
    Remotely,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl JobLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLocation::Onsite => "onsite",
            JobLocation::Remotely => "remotely",
            JobLocation::Hybrid => "hybrid",
        }
    }
}

impl Default for JobLocation {
    fn default() -> Self {
        JobLocation::Onsite
    }
}

impl Display for JobLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobLocation {
    type Err = JobEnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onsite" => Ok(JobLocation::Onsite),
            "remotely" => Ok(JobLocation::Remotely),
            "hybrid" => Ok(JobLocation::Hybrid),
            other => Err(JobEnumParseError { kind: "job location", value: other.to_string() }),
        }
    }
}

/// Part-time vs. full-time engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WorkingTime {
    #[serde(rename = "partTime")]
    PartTime,
    #[serde(rename = "fullTime")]
    FullTime,
}

impl WorkingTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkingTime::PartTime => "partTime",
            WorkingTime::FullTime => "fullTime",
        }
    }
}

impl Default for WorkingTime {
    fn default() -> Self {
        WorkingTime::FullTime
    }
}

impl Display for WorkingTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkingTime {
    type Err = JobEnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partTime" => Ok(WorkingTime::PartTime),
            "fullTime" => Ok(WorkingTime::FullTime),
            other => Err(JobEnumParseError { kind: "working time", value: other.to_string() }),
        }
    }
}

/// Seniority ladder for a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SeniorityLevel {
    #[serde(rename = "junior")]
    Junior,
    #[serde(rename = "midLevel")]
    MidLevel,
    #[serde(rename = "senior")]
    Senior,
    #[serde(rename = "teamLead")]
    TeamLead,
    #[serde(rename = "CTO")]
    Cto,
}

impl SeniorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeniorityLevel::Junior => "junior",
            SeniorityLevel::MidLevel => "midLevel",
            SeniorityLevel::Senior => "senior",
            SeniorityLevel::TeamLead => "teamLead",
            SeniorityLevel::Cto => "CTO",
        }
    }
}

impl Default for SeniorityLevel {
    fn default() -> Self {
        SeniorityLevel::MidLevel
    }
}

impl Display for SeniorityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeniorityLevel {
    type Err = JobEnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(SeniorityLevel::Junior),
            "midLevel" => Ok(SeniorityLevel::MidLevel),
            "senior" => Ok(SeniorityLevel::Senior),
            "teamLead" => Ok(SeniorityLevel::TeamLead),
            "CTO" => Ok(SeniorityLevel::Cto),
            other => Err(JobEnumParseError { kind: "seniority level", value: other.to_string() }),
        }
    }
}

/// Error returned when parsing a job enum from its stored form fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct JobEnumParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Stored representation of a job posting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub location: JobLocation,
    pub working_time: WorkingTime,
    pub seniority: SeniorityLevel,
    pub description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// The HR user that posted this job.
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Check whether the given user owns this posting.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.added_by == *user_id
    }
}

/// New job database payload.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: JobId,
    pub title: String,
    pub location: JobLocation,
    pub working_time: WorkingTime,
    pub seniority: SeniorityLevel,
    pub description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub added_by: UserId,
}

/// Update payload for an existing job.
#[derive(Debug, Clone, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub location: Option<JobLocation>,
    pub working_time: Option<WorkingTime>,
    pub seniority: Option<SeniorityLevel>,
    pub description: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
}

/// Request to create a job posting.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Job title cannot be empty"))]
    pub job_title: String,
    #[serde(default)]
    pub job_location: JobLocation,
    #[serde(default)]
    pub working_time: WorkingTime,
    #[serde(default)]
    pub seniority_level: SeniorityLevel,
    #[validate(length(min = 1, message = "Job description cannot be empty"))]
    pub job_description: String,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

/// Request to update a job posting. All fields optional.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, message = "Job title cannot be empty"))]
    pub job_title: Option<String>,
    pub job_location: Option<JobLocation>,
    pub working_time: Option<WorkingTime>,
    pub seniority_level: Option<SeniorityLevel>,
    pub job_description: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
}

/// Public view of a job posting.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: JobId,
    pub job_title: String,
    pub job_location: JobLocation,
    pub working_time: WorkingTime,
    pub seniority_level: SeniorityLevel,
    pub job_description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            job_title: job.title,
            job_location: job.location,
            working_time: job.working_time,
            seniority_level: job.seniority,
            job_description: job.description,
            technical_skills: job.technical_skills,
            soft_skills: job.soft_skills,
            added_by: job.added_by,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// A job annotated with the company that posted it, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobWithCompanyResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    pub company_info: Option<CompanyResponse>,
}

/// Optional filter over job postings. Absent fields are not filtered on;
/// a present skill list must match a posting's technical skills exactly.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub working_time: Option<WorkingTime>,
    pub location: Option<JobLocation>,
    pub seniority: Option<SeniorityLevel>,
    pub title: Option<String>,
    pub technical_skills: Option<Vec<String>>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        self.working_time.is_none()
            && self.location.is_none()
            && self.seniority.is_none()
            && self.title.is_none()
            && self.technical_skills.is_none()
    }
}
