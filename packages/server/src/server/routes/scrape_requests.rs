use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{SchoolId, ScrapeRequestId, UserId};
use crate::domains::scrape_request::activities::process_scrape_request;
use crate::domains::scrape_request::{NewScrapeRequest, ScrapeRequest, ScrapeStatus};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RequesterQuery {
    pub user_id: UserId,
    pub school_id: SchoolId,
}

#[derive(Debug, Serialize)]
pub struct ProcessingAccepted {
    pub message: &'static str,
    pub id: ScrapeRequestId,
}

pub async fn create_scrape_request_handler(
    Extension(state): Extension<AppState>,
    Query(requester): Query<RequesterQuery>,
    Json(input): Json<NewScrapeRequest>,
) -> ApiResult<(StatusCode, Json<ScrapeRequest>)> {
    if input.org_name.trim().is_empty() || input.website_url.trim().is_empty() {
        return Err(ApiError::bad_request("org_name and website_url are required"));
    }
    let request = ScrapeRequest::create(
        requester.user_id,
        requester.school_id,
        &input,
        &state.db_pool,
    )
    .await?;
    tracing::info!(request_id = %request.id, website_url = %request.website_url, "Scrape request created");
    Ok((StatusCode::CREATED, Json(request)))
}

/// Start processing in the background and return immediately
pub async fn process_scrape_request_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<ScrapeRequestId>,
) -> ApiResult<(StatusCode, Json<ProcessingAccepted>)> {
    let request = ScrapeRequest::find_by_id(id, &state.db_pool).await?;
    if request.status()? != ScrapeStatus::Pending {
        return Err(ApiError::bad_request(format!(
            "scrape request {} is {}, expected pending",
            id, request.status
        )));
    }

    let deps = state.deps.clone();
    tokio::spawn(async move {
        if let Err(e) = process_scrape_request(id, &deps).await {
            tracing::error!(request_id = %id, error = %format!("{:#}", e), "Scrape request processing failed");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessingAccepted {
            message: "Processing started",
            id,
        }),
    ))
}

pub async fn list_user_scrape_requests_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<ScrapeRequest>>> {
    Ok(Json(ScrapeRequest::find_by_user(user_id, &state.db_pool).await?))
}

pub async fn list_pending_scrape_requests_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<ScrapeRequest>>> {
    Ok(Json(ScrapeRequest::find_pending(&state.db_pool).await?))
}
