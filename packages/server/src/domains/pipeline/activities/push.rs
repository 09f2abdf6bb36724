//! Upload-only pushes used by the frontend; nothing is triggered or polled.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domains::pipeline::{validate_file_name, PipelineError};
use crate::domains::scraping::{scrape_site_text, SITE_TEXT_SUBPAGES};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushResult {
    pub message: String,
    pub file_name: String,
}

/// Push a scraped site (`kind = "text"`) or a local image (`kind = "image"`).
///
/// Text is stored under the bare file name; images are read from the
/// artifact directory and uploaded with the file name as media item path.
pub async fn push_file(
    deps: &ServerDeps,
    kind: &str,
    file_name: &str,
    url: Option<&str>,
) -> Result<PushResult> {
    let settings = &deps.pipeline;
    let file_name = validate_file_name(file_name)?.to_string();

    match kind {
        "text" => {
            let url = url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .ok_or_else(|| PipelineError::InvalidRequest("url is required for kind='text'".into()))?;

            let text = scrape_site_text(deps.web_scraper.as_ref(), url, SITE_TEXT_SUBPAGES).await?;
            deps.platform
                .upload_file(&settings.datasets.text_input, &file_name, text.into_bytes())
                .await
                .with_context(|| format!("Failed to upload {}", file_name))?;

            tracing::info!(file_name = %file_name, url, "Text file pushed");
            Ok(PushResult {
                message: "text file uploaded".to_string(),
                file_name,
            })
        }
        "image" => {
            let path = settings.artifact_dir.join(&file_name);
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            let rid = deps
                .platform
                .upload_media_item(&settings.datasets.image_input_media_set, &file_name, bytes)
                .await
                .with_context(|| format!("Failed to upload media item {}", file_name))?;

            tracing::info!(file_name = %file_name, media_item_rid = ?rid, "Image pushed");
            Ok(PushResult {
                message: "image uploaded".to_string(),
                file_name,
            })
        }
        other => Err(PipelineError::InvalidRequest(format!(
            "kind must be 'text' or 'image', got '{}'",
            other
        ))
        .into()),
    }
}
