use std::collections::BTreeMap;

use axum::{
    extract::{Extension, Multipart},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domains::pipeline::activities::{
    output_rows, push_file, submit_image, submit_text, wait_for_media_item_rows, PushResult,
};
use crate::domains::pipeline::{DatasetKey, PollOutcome, PollState, SourceArtifact};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

type Records = Vec<Map<String, Value>>;

fn rows_by_dataset(outcome: &PollOutcome) -> BTreeMap<DatasetKey, Records> {
    outcome
        .results
        .iter()
        .map(|(key, table)| (*key, table.to_records()))
        .collect()
}

// =============================================================================
// Upload-only push and one-shot reads
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PushFileRequest {
    pub kind: String,
    pub file_name: String,
    pub url: Option<String>,
}

pub async fn push_file_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<PushFileRequest>,
) -> ApiResult<Json<PushResult>> {
    let result = push_file(&state.deps, &req.kind, &req.file_name, req.url.as_deref()).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct GetDatasetRequest {
    pub dataset: String,
    pub file_name: Option<String>,
    pub org_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub message: &'static str,
    pub rows: Records,
}

pub async fn get_dataset_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<GetDatasetRequest>,
) -> ApiResult<Json<DatasetResponse>> {
    let dataset: DatasetKey = req
        .dataset
        .parse()
        .map_err(|e: anyhow::Error| ApiError::bad_request(e.to_string()))?;

    let rows = output_rows(&state.deps, dataset, req.file_name, req.org_name).await?;
    Ok(Json(DatasetResponse {
        message: "Dataset located",
        rows: rows.to_records(),
    }))
}

// =============================================================================
// Full pipeline paths
// =============================================================================

/// Either inline `text` (with a `file_name`) or a `url` to scrape
#[derive(Debug, Deserialize)]
pub struct TextSubmission {
    pub url: Option<String>,
    pub text: Option<String>,
    pub file_name: Option<String>,
    pub org_name: Option<String>,
}

impl TextSubmission {
    fn into_artifact(self) -> ApiResult<(SourceArtifact, Option<String>)> {
        let org_name = self.org_name.filter(|n| !n.trim().is_empty());
        let artifact = match (self.text, self.url) {
            (Some(text), _) => {
                let file_name = self
                    .file_name
                    .ok_or_else(|| ApiError::bad_request("file_name is required with text"))?;
                SourceArtifact::Inline {
                    file_name,
                    bytes: text.into_bytes(),
                }
            }
            (None, Some(url)) if !url.trim().is_empty() => SourceArtifact::Url {
                url,
                file_name: self.file_name,
            },
            _ => return Err(ApiError::bad_request("either text or url is required")),
        };
        Ok((artifact, org_name))
    }
}

#[derive(Debug, Serialize)]
pub struct TextSubmissionResponse {
    pub file_name: String,
    pub remote_path: String,
    pub schedule_run: Option<String>,
    pub state: PollState,
    pub iterations: u32,
    pub elapsed_ms: u64,
    pub rows: BTreeMap<DatasetKey, Records>,
}

pub async fn submit_text_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<TextSubmission>,
) -> ApiResult<Json<TextSubmissionResponse>> {
    let (artifact, org_name) = req.into_artifact()?;
    let result = submit_text(&state.deps, artifact, org_name).await?;

    Ok(Json(TextSubmissionResponse {
        rows: rows_by_dataset(&result.outcome),
        state: result.outcome.state,
        iterations: result.outcome.iterations,
        elapsed_ms: result.outcome.elapsed_ms,
        file_name: result.file_name,
        remote_path: result.remote_path,
        schedule_run: result.schedule_run,
    }))
}

#[derive(Debug, Serialize)]
pub struct ImageSubmissionResponse {
    pub file_name: String,
    pub media_item_path: String,
    pub media_item_rid: Option<String>,
    pub build_rid: String,
    pub state: PollState,
    pub rows: Records,
}

/// Multipart upload with a single `file` field
pub async fn submit_image_handler(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImageSubmissionResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("file field has no file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let result = submit_image(&state.deps, &file_name, bytes).await?;

    let rows = result
        .outcome
        .rows(DatasetKey::Events)
        .map(|t| t.to_records())
        .unwrap_or_default();

    Ok(Json(ImageSubmissionResponse {
        file_name: result.file_name,
        media_item_path: result.media_item_path,
        media_item_rid: result.media_item_rid,
        build_rid: result.build_rid,
        state: result.outcome.state,
        rows,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MediaRowsRequest {
    pub media_item_rid: String,
    #[serde(default)]
    pub trigger_schedule: bool,
}

#[derive(Debug, Serialize)]
pub struct MediaRowsResponse {
    pub state: PollState,
    pub rows: Records,
}

/// Wait for event rows of a media item uploaded earlier
pub async fn media_rows_handler(
    Extension(state): Extension<AppState>,
    Json(req): Json<MediaRowsRequest>,
) -> ApiResult<Json<MediaRowsResponse>> {
    let outcome = wait_for_media_item_rows(&state.deps, &req.media_item_rid, req.trigger_schedule).await?;
    let rows = outcome
        .rows(DatasetKey::Events)
        .map(|t| t.to_records())
        .unwrap_or_default();

    Ok(Json(MediaRowsResponse {
        state: outcome.state,
        rows,
    }))
}
