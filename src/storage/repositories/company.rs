//! Company repository.
//!
//! CRUD and uniqueness queries for companies, the case-insensitive name
//! search, and the company-deletion cascade plan.

use crate::domain::{Company, CompanyId, NewCompany, UpdateCompany, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct CompanyRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub address: String,
    pub employee_count: i64,
    pub contact_email: String,
    pub company_hr: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COMPANY_COLUMNS: &str = "id, name, description, industry, address, employee_count, \
     contact_email, company_hr, created_at, updated_at";

/// Counts of dependent rows removed by the company-deletion cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyCascadeReport {
    pub applications: u64,
    pub jobs: u64,
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Create a new company
    async fn create_company(&self, company: NewCompany) -> Result<Company>;

    /// Get a company by ID
    async fn get_company(&self, id: &CompanyId) -> Result<Option<Company>>;

    /// Get the company owned by an HR user, if any
    async fn get_company_by_hr(&self, hr: &UserId) -> Result<Option<Company>>;

    /// Get a company by exact name
    async fn get_company_by_name(&self, name: &str) -> Result<Option<Company>>;

    /// Check whether a company (other than `exclude`, when given) already
    /// holds the name, contact email, or HR reference
    async fn conflict_exists(
        &self,
        name: Option<&str>,
        contact_email: Option<&str>,
        company_hr: Option<&UserId>,
        exclude: Option<&CompanyId>,
    ) -> Result<bool>;

    /// Update a company's details
    async fn update_company(&self, id: &CompanyId, update: UpdateCompany) -> Result<Company>;

    /// Delete a company together with the owning HR user's job postings and
    /// the applications under those postings. Runs as a single transaction.
    async fn delete_with_postings(&self, company: &Company) -> Result<CompanyCascadeReport>;

    /// Case-insensitive substring search over company names
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Company>>;
}

#[derive(Debug, Clone)]
pub struct SqlxCompanyRepository {
    pool: DbPool,
}

impl SqlxCompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_company(&self, row: CompanyRow) -> Company {
        Company {
            id: CompanyId::from_string(row.id),
            name: row.name,
            description: row.description,
            industry: row.industry,
            address: row.address,
            employee_count: row.employee_count,
            contact_email: row.contact_email,
            company_hr: UserId::from_string(row.company_hr),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CompanyRepository for SqlxCompanyRepository {
    #[instrument(skip(self, company), fields(company_name = %company.name, company_id = %company.id), name = "db_create_company")]
    async fn create_company(&self, company: NewCompany) -> Result<Company> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO companies (id, name, description, industry, address, employee_count,
                                   contact_email, company_hr, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(company.id.as_str())
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.industry)
        .bind(&company.address)
        .bind(company.employee_count)
        .bind(&company.contact_email)
        .bind(company.company_hr.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to create company"))?;

        self.get_company(&company.id)
            .await?
            .ok_or_else(|| Error::internal("Company not found after creation"))
    }

    #[instrument(skip(self), fields(company_id = %id), name = "db_get_company")]
    async fn get_company(&self, id: &CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch company"))?;

        Ok(row.map(|r| self.row_to_company(r)))
    }

    #[instrument(skip(self), fields(user_id = %hr), name = "db_get_company_by_hr")]
    async fn get_company_by_hr(&self, hr: &UserId) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE company_hr = $1",
            COMPANY_COLUMNS
        ))
        .bind(hr.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch company by HR user"))?;

        Ok(row.map(|r| self.row_to_company(r)))
    }

    #[instrument(skip(self), fields(company_name = %name), name = "db_get_company_by_name")]
    async fn get_company_by_name(&self, name: &str) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE name = $1",
            COMPANY_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch company by name"))?;

        Ok(row.map(|r| self.row_to_company(r)))
    }

    #[instrument(skip(self), name = "db_company_conflict_exists")]
    async fn conflict_exists(
        &self,
        name: Option<&str>,
        contact_email: Option<&str>,
        company_hr: Option<&UserId>,
        exclude: Option<&CompanyId>,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM companies
            WHERE ((name = $1 AND $1 IS NOT NULL)
                OR (contact_email = $2 AND $2 IS NOT NULL)
                OR (company_hr = $3 AND $3 IS NOT NULL))
              AND ($4 IS NULL OR id != $4)
            "#,
        )
        .bind(name)
        .bind(contact_email)
        .bind(company_hr.map(|id| id.as_str()))
        .bind(exclude.map(|id| id.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to check company uniqueness"))?;

        Ok(count > 0)
    }

    #[instrument(skip(self, update), fields(company_id = %id), name = "db_update_company")]
    async fn update_company(&self, id: &CompanyId, update: UpdateCompany) -> Result<Company> {
        let current = self
            .get_company(id)
            .await?
            .ok_or_else(|| Error::not_found("Company", id.to_string()))?;

        let name = update.name.unwrap_or(current.name);
        let description = update.description.unwrap_or(current.description);
        let industry = update.industry.unwrap_or(current.industry);
        let address = update.address.unwrap_or(current.address);
        let employee_count = update.employee_count.unwrap_or(current.employee_count);
        let contact_email = update.contact_email.unwrap_or(current.contact_email);

        sqlx::query(
            r#"
            UPDATE companies
            SET name = $1, description = $2, industry = $3, address = $4,
                employee_count = $5, contact_email = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(&industry)
        .bind(&address)
        .bind(employee_count)
        .bind(&contact_email)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to update company"))?;

        self.get_company(id)
            .await?
            .ok_or_else(|| Error::internal("Company not found after update"))
    }

    #[instrument(skip(self, company), fields(company_id = %company.id), name = "db_delete_company_cascade")]
    async fn delete_with_postings(&self, company: &Company) -> Result<CompanyCascadeReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::database(err, "Failed to start company deletion"))?;

        // Applications under the HR user's postings go first, then the
        // postings, then the company itself.
        let applications = sqlx::query(
            "DELETE FROM applications WHERE job_id IN (SELECT id FROM jobs WHERE added_by = $1)",
        )
        .bind(company.company_hr.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::database(err, "Failed to delete company applications"))?
        .rows_affected();

        let jobs = sqlx::query("DELETE FROM jobs WHERE added_by = $1")
            .bind(company.company_hr.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete company jobs"))?
            .rows_affected();

        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(company.id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::database(err, "Failed to delete company"))?;

        tx.commit()
            .await
            .map_err(|err| Error::database(err, "Failed to commit company deletion"))?;

        Ok(CompanyCascadeReport { applications, jobs })
    }

    #[instrument(skip(self), fields(fragment = %fragment), name = "db_search_companies")]
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Company>> {
        let pattern = format!("%{}%", fragment.to_lowercase());

        let rows = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE lower(name) LIKE $1 ORDER BY name",
            COMPANY_COLUMNS
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to search companies"))?;

        Ok(rows.into_iter().map(|r| self.row_to_company(r)).collect())
    }
}
