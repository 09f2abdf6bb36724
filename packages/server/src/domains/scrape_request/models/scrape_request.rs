use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{OrganizationId, SchoolId, ScrapeRequestId, UserId};
use crate::domains::organization::OrgType;

/// A user's request to add an organization by scraping its website
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScrapeRequest {
    pub id: ScrapeRequestId,
    pub user_id: UserId,
    pub school_id: SchoolId,
    pub org_name: String,
    pub website_url: String,
    pub suggested_type: Option<String>, // see OrgType
    pub status: String,                 // see ScrapeStatus
    pub organization_id: Option<OrganizationId>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScrapeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(anyhow::anyhow!("Invalid scrape status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewScrapeRequest {
    pub org_name: String,
    pub website_url: String,
    pub suggested_type: Option<OrgType>,
}

impl ScrapeRequest {
    pub fn status(&self) -> Result<ScrapeStatus> {
        self.status.parse()
    }

    pub fn suggested_type(&self) -> Option<OrgType> {
        self.suggested_type.as_deref().and_then(|t| t.parse().ok())
    }

    pub async fn find_by_id(id: ScrapeRequestId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM org_scrape_requests WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Record a new request as pending
    pub async fn create(
        user_id: UserId,
        school_id: SchoolId,
        input: &NewScrapeRequest,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO org_scrape_requests (
                id, user_id, school_id, org_name, website_url, suggested_type, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ScrapeRequestId::new())
        .bind(user_id)
        .bind(school_id)
        .bind(&input.org_name)
        .bind(&input.website_url)
        .bind(input.suggested_type.map(|t| t.as_str()))
        .bind(ScrapeStatus::Pending.as_str())
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Requests of a user, newest first
    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM org_scrape_requests WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending requests, oldest first
    pub async fn find_pending(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM org_scrape_requests WHERE status = $1 ORDER BY created_at, id",
        )
        .bind(ScrapeStatus::Pending.as_str())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Move a pending request to processing.
    ///
    /// Returns `None` when the request is missing or no longer pending, so only
    /// one worker ever owns a request.
    pub async fn claim(id: ScrapeRequestId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE org_scrape_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ScrapeStatus::Processing.as_str())
        .bind(ScrapeStatus::Pending.as_str())
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_completed(
        id: ScrapeRequestId,
        organization_id: OrganizationId,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE org_scrape_requests
            SET status = $2, organization_id = $3, error_message = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ScrapeStatus::Completed.as_str())
        .bind(organization_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_failed(id: ScrapeRequestId, error_message: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE org_scrape_requests
            SET status = $2, error_message = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ScrapeStatus::Failed.as_str())
        .bind(error_message)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
