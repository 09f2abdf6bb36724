use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{OrganizationId, SchoolId};

/// Organization - a student club, chapter or society at one school
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: OrganizationId,
    pub school_id: SchoolId,
    pub name: String,
    pub org_type: String, // see OrgType
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub application_deadline: Option<String>,
    pub application_requirements: Option<String>,
    pub contact_email: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization with the number of applications tracked against it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PopularOrganization {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub organization: Organization,
    pub application_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    Fraternity,
    Sorority,
    Club,
    HonorSociety,
    Professional,
    Academic,
    Service,
    Recreational,
    Religious,
    Cultural,
    Other,
}

impl OrgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fraternity => "fraternity",
            Self::Sorority => "sorority",
            Self::Club => "club",
            Self::HonorSociety => "honor_society",
            Self::Professional => "professional",
            Self::Academic => "academic",
            Self::Service => "service",
            Self::Recreational => "recreational",
            Self::Religious => "religious",
            Self::Cultural => "cultural",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for OrgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrgType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fraternity" => Ok(Self::Fraternity),
            "sorority" => Ok(Self::Sorority),
            "club" => Ok(Self::Club),
            "honor_society" => Ok(Self::HonorSociety),
            "professional" => Ok(Self::Professional),
            "academic" => Ok(Self::Academic),
            "service" => Ok(Self::Service),
            "recreational" => Ok(Self::Recreational),
            "religious" => Ok(Self::Religious),
            "cultural" => Ok(Self::Cultural),
            "other" => Ok(Self::Other),
            _ => Err(anyhow::anyhow!("Invalid organization type: {}", s)),
        }
    }
}

/// Fields written when an organization is created or refreshed from a scrape
#[derive(Debug, Clone)]
pub struct OrganizationData {
    pub school_id: SchoolId,
    pub name: String,
    pub org_type: OrgType,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub application_deadline: Option<String>,
    pub application_requirements: Option<String>,
    pub contact_email: Option<String>,
    pub is_verified: bool,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationUpdate {
    pub name: Option<String>,
    pub org_type: Option<OrgType>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub application_deadline: Option<String>,
    pub application_requirements: Option<String>,
    pub contact_email: Option<String>,
    pub is_verified: Option<bool>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Organization {
    /// Find organization by ID
    pub async fn find_by_id(id: OrganizationId, pool: &PgPool) -> Result<Self> {
        let org = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(org)
    }

    /// All organizations of a school
    pub async fn find_by_school(school_id: SchoolId, pool: &PgPool) -> Result<Vec<Self>> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE school_id = $1 ORDER BY name",
        )
        .bind(school_id)
        .fetch_all(pool)
        .await?;
        Ok(orgs)
    }

    /// Case-insensitive name substring search within a school
    pub async fn search(school_id: SchoolId, query: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let orgs = sqlx::query_as::<_, Organization>(
            r#"
            SELECT * FROM organizations
            WHERE school_id = $1
              AND name ILIKE $2
            ORDER BY name
            "#,
        )
        .bind(school_id)
        .bind(format!("%{}%", query))
        .fetch_all(pool)
        .await?;
        Ok(orgs)
    }

    /// Organizations ordered by how many applications reference them
    pub async fn find_popular(
        school_id: SchoolId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<PopularOrganization>> {
        let orgs = sqlx::query_as::<_, PopularOrganization>(
            r#"
            SELECT o.*, COUNT(a.id) AS application_count
            FROM organizations o
            LEFT JOIN user_org_applications a ON a.organization_id = o.id
            WHERE o.school_id = $1
            GROUP BY o.id
            ORDER BY application_count DESC, o.name
            LIMIT $2
            "#,
        )
        .bind(school_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(orgs)
    }

    /// Existing organization at the school with the same name or website
    pub async fn find_by_name_or_website(
        school_id: SchoolId,
        name: &str,
        website_url: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            SELECT * FROM organizations
            WHERE school_id = $1
              AND (name = $2 OR ($3::text IS NOT NULL AND website_url = $3))
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(school_id)
        .bind(name)
        .bind(website_url)
        .fetch_optional(pool)
        .await?;
        Ok(org)
    }

    /// Insert new organization
    pub async fn create(data: &OrganizationData, pool: &PgPool) -> Result<Self> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (
                id, school_id, name, org_type, description, website_url,
                application_deadline, application_requirements, contact_email, is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(OrganizationId::new())
        .bind(data.school_id)
        .bind(&data.name)
        .bind(data.org_type.as_str())
        .bind(&data.description)
        .bind(&data.website_url)
        .bind(&data.application_deadline)
        .bind(&data.application_requirements)
        .bind(&data.contact_email)
        .bind(data.is_verified)
        .fetch_one(pool)
        .await?;
        Ok(org)
    }

    /// Overwrite all scraped fields of an existing organization
    pub async fn replace(id: OrganizationId, data: &OrganizationData, pool: &PgPool) -> Result<Self> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET school_id = $2,
                name = $3,
                org_type = $4,
                description = $5,
                website_url = $6,
                application_deadline = $7,
                application_requirements = $8,
                contact_email = $9,
                is_verified = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.school_id)
        .bind(&data.name)
        .bind(data.org_type.as_str())
        .bind(&data.description)
        .bind(&data.website_url)
        .bind(&data.application_deadline)
        .bind(&data.application_requirements)
        .bind(&data.contact_email)
        .bind(data.is_verified)
        .fetch_one(pool)
        .await?;
        Ok(org)
    }

    /// Update an existing organization matched by name or website, else insert.
    /// Returns the row and whether it was newly created.
    pub async fn upsert(data: &OrganizationData, pool: &PgPool) -> Result<(Self, bool)> {
        let existing = Self::find_by_name_or_website(
            data.school_id,
            &data.name,
            data.website_url.as_deref(),
            pool,
        )
        .await?;

        match existing {
            Some(org) => Ok((Self::replace(org.id, data, pool).await?, false)),
            None => Ok((Self::create(data, pool).await?, true)),
        }
    }

    /// Apply a partial update
    pub async fn update(id: OrganizationId, update: &OrganizationUpdate, pool: &PgPool) -> Result<Self> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name),
                org_type = COALESCE($3, org_type),
                description = COALESCE($4, description),
                website_url = COALESCE($5, website_url),
                application_deadline = COALESCE($6, application_deadline),
                application_requirements = COALESCE($7, application_requirements),
                contact_email = COALESCE($8, contact_email),
                is_verified = COALESCE($9, is_verified),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.org_type.map(|t| t.as_str()))
        .bind(&update.description)
        .bind(&update.website_url)
        .bind(&update.application_deadline)
        .bind(&update.application_requirements)
        .bind(&update.contact_email)
        .bind(update.is_verified)
        .fetch_one(pool)
        .await?;
        Ok(org)
    }
}
