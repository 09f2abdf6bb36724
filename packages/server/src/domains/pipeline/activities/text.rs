//! Text path: artifact → dated upload → schedule → poll qna / summary / general.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domains::pipeline::{
    dated_path_today, poll_until_match, validate_file_name, MatchTarget, OutputTable, PollConfig,
    PollOutcome, SourceArtifact, DEFAULT_SCRAPE_FILE_NAME, INCOMING_FOLDER,
};
use crate::domains::scraping::{scrape_site_text, SITE_TEXT_SUBPAGES};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
pub struct TextPathResult {
    pub file_name: String,
    pub remote_path: String,
    /// Schedule run started for this submission, when a schedule is configured
    pub schedule_run: Option<String>,
    pub outcome: PollOutcome,
}

/// Bytes and bare file name of an artifact
pub(crate) async fn resolve_artifact(
    deps: &ServerDeps,
    artifact: SourceArtifact,
) -> Result<(String, Vec<u8>)> {
    match artifact {
        SourceArtifact::Url { url, file_name } => {
            let file_name = file_name.unwrap_or_else(|| DEFAULT_SCRAPE_FILE_NAME.to_string());
            let file_name = validate_file_name(&file_name)?.to_string();
            let text = scrape_site_text(deps.web_scraper.as_ref(), &url, SITE_TEXT_SUBPAGES).await?;
            Ok((file_name, text.into_bytes()))
        }
        SourceArtifact::LocalFile(path) => {
            let file_name = file_name_of_path(&path)?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((file_name, bytes))
        }
        SourceArtifact::Inline { file_name, bytes } => {
            let file_name = validate_file_name(&file_name)?.to_string();
            Ok((file_name, bytes))
        }
    }
}

fn file_name_of_path(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(validate_file_name(name)?.to_string())
}

/// Upload a text artifact under `folder/{today}/`, trigger the schedule and
/// poll the text outputs.
pub(crate) async fn run_text_upload(
    deps: &ServerDeps,
    folder: &str,
    file_name: String,
    bytes: Vec<u8>,
    org_name: Option<String>,
    poll: PollConfig,
) -> Result<TextPathResult> {
    let settings = &deps.pipeline;
    let remote_path = dated_path_today(folder, &file_name);

    deps.platform
        .upload_file(&settings.datasets.text_input, &remote_path, bytes)
        .await
        .with_context(|| format!("Failed to upload {}", remote_path))?;
    tracing::info!(remote_path = %remote_path, "Uploaded text artifact");

    let schedule_run = match &settings.schedule_rid {
        Some(schedule_rid) => {
            let run = deps
                .platform
                .run_schedule(schedule_rid)
                .await
                .with_context(|| format!("Failed to run schedule {}", schedule_rid))?;
            tracing::info!(schedule_rid = %schedule_rid, run = ?run, "Schedule triggered");
            run
        }
        None => {
            tracing::info!("No schedule configured; waiting for the pipeline to pick up the upload");
            None
        }
    };

    let tables = OutputTable::text_outputs(&settings.datasets);
    let target = MatchTarget::for_upload(&remote_path).with_org_name(org_name);
    let outcome = poll_until_match(deps.platform.as_ref(), &tables, &target, poll).await;

    Ok(TextPathResult {
        file_name,
        remote_path,
        schedule_run,
        outcome,
    })
}

/// Full text path for a scraped site, local file or inline bytes
pub async fn submit_text(
    deps: &ServerDeps,
    artifact: SourceArtifact,
    org_name: Option<String>,
) -> Result<TextPathResult> {
    let (file_name, bytes) = resolve_artifact(deps, artifact).await?;
    run_text_upload(
        deps,
        INCOMING_FOLDER,
        file_name,
        bytes,
        org_name,
        deps.pipeline.text_poll,
    )
    .await
}
