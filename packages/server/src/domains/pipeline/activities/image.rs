//! Image path: media upload → event job build → poll the events table.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domains::pipeline::{
    dated_path_today, poll_until_match, validate_file_name, DatasetKey, MatchTarget, OutputTable,
    PipelineError, PollOutcome, INCOMING_FOLDER,
};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
pub struct ImagePathResult {
    pub file_name: String,
    pub media_item_path: String,
    /// Absent when the upload response did not reveal it; matching then falls back to the file name
    pub media_item_rid: Option<String>,
    pub build_rid: String,
    pub outcome: PollOutcome,
}

/// Job that builds the events dataset: configured, else the newest one on the branch
async fn event_job_rid(deps: &ServerDeps) -> Result<String> {
    let settings = &deps.pipeline;
    if let Some(job_rid) = &settings.event_job_rid {
        return Ok(job_rid.clone());
    }

    let jobs = deps
        .platform
        .list_dataset_jobs(&settings.datasets.events)
        .await
        .context("Failed to list jobs for the events dataset")?;

    match jobs.into_iter().next() {
        Some(job_rid) => {
            tracing::info!(job_rid = %job_rid, "Discovered event job");
            Ok(job_rid)
        }
        None => Err(PipelineError::NoEventJobs {
            branch: settings.branch_name.clone(),
        }
        .into()),
    }
}

/// Upload an image, build the event job and wait for its rows
pub async fn submit_image(deps: &ServerDeps, file_name: &str, bytes: Vec<u8>) -> Result<ImagePathResult> {
    let settings = &deps.pipeline;
    let file_name = validate_file_name(file_name)?.to_string();
    let media_item_path = dated_path_today(INCOMING_FOLDER, &file_name);

    let media_item_rid = deps
        .platform
        .upload_media_item(&settings.datasets.image_input_media_set, &media_item_path, bytes)
        .await
        .with_context(|| format!("Failed to upload media item {}", media_item_path))?;
    tracing::info!(
        media_item_path = %media_item_path,
        media_item_rid = ?media_item_rid,
        "Uploaded image"
    );

    let job_rid = event_job_rid(deps).await?;
    let build_rid = deps
        .platform
        .create_build_for_jobs(std::slice::from_ref(&job_rid))
        .await
        .context("Failed to start event build")?;
    tracing::info!(build_rid = %build_rid, job_rid = %job_rid, "Event build started");

    deps.platform
        .wait_for_build(&build_rid, settings.build_poll_interval, settings.build_timeout)
        .await?;

    let tables = [OutputTable::new(DatasetKey::Events, &settings.datasets)];
    let target = MatchTarget::for_upload(&media_item_path).with_media_item_rid(media_item_rid.clone());
    let outcome = poll_until_match(deps.platform.as_ref(), &tables, &target, settings.media_poll).await;

    Ok(ImagePathResult {
        file_name,
        media_item_path,
        media_item_rid,
        build_rid,
        outcome,
    })
}

/// Poll the events table for rows of an already uploaded media item.
///
/// With `trigger_schedule` the configured schedule is fired once first; a
/// failed trigger is logged and polling continues.
pub async fn wait_for_media_item_rows(
    deps: &ServerDeps,
    media_item_rid: &str,
    trigger_schedule: bool,
) -> Result<PollOutcome> {
    let media_item_rid = media_item_rid.trim();
    if media_item_rid.is_empty() {
        return Err(PipelineError::MissingMediaItemRid.into());
    }

    let settings = &deps.pipeline;
    if trigger_schedule {
        if let Some(schedule_rid) = &settings.schedule_rid {
            if let Err(e) = deps.platform.run_schedule(schedule_rid).await {
                tracing::warn!(schedule_rid = %schedule_rid, error = %e, "Schedule trigger failed; polling anyway");
            }
        }
    }

    let tables = [OutputTable::new(DatasetKey::Events, &settings.datasets)];
    let target = MatchTarget::default().with_media_item_rid(Some(media_item_rid.to_string()));
    Ok(poll_until_match(deps.platform.as_ref(), &tables, &target, settings.media_poll).await)
}
