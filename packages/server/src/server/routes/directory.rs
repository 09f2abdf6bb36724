use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{OrganizationId, SchoolId};
use crate::domains::organization::{Organization, OrganizationUpdate, PopularOrganization};
use crate::domains::school::School;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

const DEFAULT_POPULAR_LIMIT: i64 = 10;
const MAX_POPULAR_LIMIT: i64 = 100;

// =============================================================================
// Schools
// =============================================================================

pub async fn list_schools_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<School>>> {
    Ok(Json(School::find_all(&state.db_pool).await?))
}

pub async fn get_school_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<SchoolId>,
) -> ApiResult<Json<School>> {
    Ok(Json(School::find_by_id(id, &state.db_pool).await?))
}

// =============================================================================
// Organizations
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

pub async fn list_organizations_handler(
    Extension(state): Extension<AppState>,
    Path(school_id): Path<SchoolId>,
) -> ApiResult<Json<Vec<Organization>>> {
    Ok(Json(Organization::find_by_school(school_id, &state.db_pool).await?))
}

pub async fn search_organizations_handler(
    Extension(state): Extension<AppState>,
    Path(school_id): Path<SchoolId>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Organization>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::bad_request("q must not be empty"));
    }
    Ok(Json(Organization::search(school_id, q, &state.db_pool).await?))
}

pub async fn popular_organizations_handler(
    Extension(state): Extension<AppState>,
    Path(school_id): Path<SchoolId>,
    Query(query): Query<PopularQuery>,
) -> ApiResult<Json<Vec<PopularOrganization>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);
    Ok(Json(
        Organization::find_popular(school_id, limit, &state.db_pool).await?,
    ))
}

pub async fn get_organization_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<Organization>> {
    Ok(Json(Organization::find_by_id(id, &state.db_pool).await?))
}

pub async fn update_organization_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<OrganizationId>,
    Json(update): Json<OrganizationUpdate>,
) -> ApiResult<Json<Organization>> {
    Ok(Json(Organization::update(id, &update, &state.db_pool).await?))
}
