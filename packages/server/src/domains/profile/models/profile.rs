use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ProfileId, SchoolId, UserId};

/// Directory profile of a signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub school_id: Option<SchoolId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub graduation_year: Option<i32>,
    pub major: Option<String>,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile joined with its school
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfileWithSchool {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: Profile,
    pub school_name: Option<String>,
    pub school_domain: Option<String>,
}

/// Full profile as submitted on sign-up
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub school_id: SchoolId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub graduation_year: Option<i32>,
    pub major: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub school_id: Option<SchoolId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub graduation_year: Option<i32>,
    pub major: Option<String>,
}

impl Profile {
    /// Insert or replace the user's profile and mark it completed
    pub async fn create_or_update(user_id: UserId, input: &ProfileInput, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO profiles (
                id, user_id, school_id, first_name, last_name, email,
                graduation_year, major, profile_completed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            ON CONFLICT (user_id) DO UPDATE
            SET school_id = EXCLUDED.school_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                graduation_year = EXCLUDED.graduation_year,
                major = EXCLUDED.major,
                profile_completed = TRUE,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(ProfileId::new())
        .bind(user_id)
        .bind(input.school_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(input.graduation_year)
        .bind(&input.major)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// The user's profile with school name and domain
    pub async fn find_with_school(user_id: UserId, pool: &PgPool) -> Result<Option<ProfileWithSchool>> {
        sqlx::query_as::<_, ProfileWithSchool>(
            r#"
            SELECT p.*, s.name AS school_name, s.domain AS school_domain
            FROM profiles p
            LEFT JOIN schools s ON s.id = p.school_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update(user_id: UserId, update: &ProfileUpdate, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE profiles
            SET school_id = COALESCE($2, school_id),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                graduation_year = COALESCE($5, graduation_year),
                major = COALESCE($6, major),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.school_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.graduation_year)
        .bind(&update.major)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
