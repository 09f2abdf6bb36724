use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ApplicationId, OrganizationId, UserId};

/// A user's interest in, or application to, an organization
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub application_status: String, // see ApplicationStatus
    pub application_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Interested,
    Applied,
    Interviewed,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::Applied => "applied",
            Self::Interviewed => "interviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "interested" => Ok(Self::Interested),
            "applied" => Ok(Self::Applied),
            "interviewed" => Ok(Self::Interviewed),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(anyhow::anyhow!("Invalid application status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub application_status: ApplicationStatus,
    pub application_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationUpdate {
    pub application_status: Option<ApplicationStatus>,
    pub application_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Application {
    pub async fn find_by_id(id: ApplicationId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_org_applications WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Applications of a user, newest first
    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_org_applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(user_id: UserId, input: &NewApplication, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO user_org_applications (
                id, user_id, organization_id, application_status, application_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(ApplicationId::new())
        .bind(user_id)
        .bind(input.organization_id)
        .bind(input.application_status.as_str())
        .bind(input.application_date)
        .bind(&input.notes)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update(id: ApplicationId, update: &ApplicationUpdate, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE user_org_applications
            SET application_status = COALESCE($2, application_status),
                application_date = COALESCE($3, application_date),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.application_status.map(|s| s.as_str()))
        .bind(update.application_date)
        .bind(&update.notes)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
