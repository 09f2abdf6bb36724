use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::SchoolId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub school_type: String, // 'university' | 'college' | ...
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    pub async fn find_by_id(id: SchoolId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM schools WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// All schools ordered by name
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM schools ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(
        name: &str,
        domain: Option<&str>,
        location: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO schools (id, name, domain, location)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(SchoolId::new())
        .bind(name)
        .bind(domain)
        .bind(location)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
