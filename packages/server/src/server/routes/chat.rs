use axum::{extract::Extension, Json};

use crate::domains::pipeline::activities::{analyze_essay, quick_help, EssayRequest, EssayResponse};
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn analyze_essay_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<EssayRequest>,
) -> ApiResult<Json<EssayResponse>> {
    Ok(Json(analyze_essay(&state.deps, &req).await?))
}

pub async fn quick_help_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<EssayRequest>,
) -> ApiResult<Json<EssayResponse>> {
    Ok(Json(quick_help(&state.deps, &req).await?))
}
