//! Company domain models and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CompanyId, UserId};

/// Stored representation of a company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub address: String,
    pub employee_count: i64,
    pub contact_email: String,
    /// The HR user that owns this company. Unique across companies.
    pub company_hr: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Check whether the given user owns this company.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.company_hr == *user_id
    }
}

/// New company database payload.
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub id: CompanyId,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub address: String,
    pub employee_count: i64,
    pub contact_email: String,
    pub company_hr: UserId,
}

/// Update payload for an existing company.
#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub employee_count: Option<i64>,
    pub contact_email: Option<String>,
}

/// Request to register a new company.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, message = "Company name cannot be empty"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "Industry cannot be empty"))]
    pub industry: String,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: String,
    #[validate(range(min = 2, max = 50, message = "Employee count must be between 2 and 50"))]
    pub no_of_employees: i64,
    #[validate(email(message = "Invalid company email"))]
    pub company_email: String,
}

/// Request to update an existing company. All fields optional.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Company name cannot be empty"))]
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 2, max = 50, message = "Employee count must be between 2 and 50"))]
    pub no_of_employees: Option<i64>,
    #[validate(email(message = "Invalid company email"))]
    pub company_email: Option<String>,
}

/// Public view of a company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: CompanyId,
    pub company_name: String,
    pub description: String,
    pub industry: String,
    pub address: String,
    pub no_of_employees: i64,
    pub company_email: String,
    pub company_hr: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            company_name: company.name,
            description: company.description,
            industry: company.industry,
            address: company.address,
            no_of_employees: company.employee_count,
            company_email: company.contact_email,
            company_hr: company.company_hr,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_company(hr: UserId) -> Company {
        Company {
            id: CompanyId::new(),
            name: "Initech".to_string(),
            description: "TPS report automation".to_string(),
            industry: "Software".to_string(),
            address: "Austin, TX".to_string(),
            employee_count: 20,
            contact_email: "contact@initech.example".to_string(),
            company_hr: hr,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ownership_is_exact_id_equality() {
        let hr = UserId::new();
        let company = sample_company(hr.clone());

        assert!(company.is_owned_by(&hr));
        assert!(!company.is_owned_by(&UserId::new()));
    }

    #[test]
    fn create_request_validates_employee_bounds() {
        let mut request = CreateCompanyRequest {
            company_name: "Initech".to_string(),
            description: "desc".to_string(),
            industry: "Software".to_string(),
            address: "Austin".to_string(),
            no_of_employees: 20,
            company_email: "contact@initech.example".to_string(),
        };
        assert!(request.validate().is_ok());

        request.no_of_employees = 1;
        assert!(request.validate().is_err());

        request.no_of_employees = 51;
        assert!(request.validate().is_err());
    }

    #[test]
    fn response_conversion_maps_all_fields() {
        let hr = UserId::new();
        let company = sample_company(hr.clone());
        let response: CompanyResponse = company.clone().into();

        assert_eq!(response.id, company.id);
        assert_eq!(response.company_name, "Initech");
        assert_eq!(response.no_of_employees, 20);
        assert_eq!(response.company_hr, hr);
    }

    #[test]
    fn update_request_accepts_partial_payload() {
        let json = r#"{ "companyName": "Globex" }"#;
        let request: UpdateCompanyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.company_name, Some("Globex".to_string()));
        assert!(request.company_email.is_none());
    }
}
