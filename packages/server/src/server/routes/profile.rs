use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::UserId;
use crate::domains::profile::{Profile, ProfileInput, ProfileUpdate, ProfileWithSchool};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

pub async fn get_profile_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<ProfileWithSchool>> {
    Profile::find_with_school(user_id, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No profile for user {}", user_id)))
}

pub async fn create_profile_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(Profile::create_or_update(user_id, &input, &state.db_pool).await?))
}

pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(Profile::update(user_id, &update, &state.db_pool).await?))
}
