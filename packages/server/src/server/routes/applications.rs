use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::{ApplicationId, UserId};
use crate::domains::organization::{Application, ApplicationUpdate, NewApplication};
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn list_applications_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Application>>> {
    Ok(Json(Application::find_by_user(user_id, &state.db_pool).await?))
}

pub async fn create_application_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
    Json(input): Json<NewApplication>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let application = Application::create(user_id, &input, &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn update_application_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<ApplicationId>,
    Json(update): Json<ApplicationUpdate>,
) -> ApiResult<Json<Application>> {
    Ok(Json(Application::update(id, &update, &state.db_pool).await?))
}
