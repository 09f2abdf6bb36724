use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Dataset identifiers the pipeline reads from and writes to
#[derive(Debug, Clone)]
pub struct PipelineDatasets {
    /// Filesystem dataset receiving text artifacts
    pub text_input: String,
    /// Media set receiving image uploads
    pub image_input_media_set: String,
    pub qna: String,
    pub summary: String,
    pub general: String,
    pub events: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub foundry_hostname: String,
    pub foundry_token: String,
    pub https_proxy: Option<String>,
    pub foundry_branch: String,
    pub schedule_rid: Option<String>,
    pub event_job_rid: Option<String>,
    pub datasets: PipelineDatasets,
    pub artifact_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub scrape_request_cron: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            foundry_hostname: required("FOUNDRY_HOSTNAME")?,
            foundry_token: required("FOUNDRY_TOKEN")?,
            https_proxy: optional("HTTPS_PROXY"),
            foundry_branch: optional("FOUNDRY_BRANCH").unwrap_or_else(|| "master".to_string()),
            schedule_rid: optional("FOUNDRY_SCHEDULE_RID"),
            event_job_rid: optional("EVENT_JOB_RID"),
            datasets: PipelineDatasets {
                text_input: required("TEXT_INPUT_DATASET_RID")?,
                image_input_media_set: required("IMAGE_INPUT_MEDIA_SET_RID")?,
                qna: required("QNA_DATASET_RID")?,
                summary: required("SUMMARY_DATASET_RID")?,
                general: required("GENERAL_DATASET_RID")?,
                events: required("EVENT_DATASET_RID")?,
            },
            artifact_dir: optional("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            allowed_origins: optional("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            scrape_request_cron: optional("SCRAPE_REQUEST_CRON")
                .unwrap_or_else(|| "0 */15 * * * *".to_string()),
        })
    }
}

/// Required and non-blank
fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{} must be set", key))
}

/// Unset and blank values are treated the same
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
