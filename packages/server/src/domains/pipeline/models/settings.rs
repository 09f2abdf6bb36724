use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, PipelineDatasets};
use crate::domains::pipeline::poller::PollConfig;

/// Build status is checked every 5s
pub const BUILD_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Builds get 30 minutes
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Everything the pipeline activities need besides the platform itself
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub branch_name: String,
    pub schedule_rid: Option<String>,
    pub event_job_rid: Option<String>,
    pub datasets: PipelineDatasets,
    /// Local directory image pushes are read from
    pub artifact_dir: PathBuf,
    pub text_poll: PollConfig,
    pub chat_poll: PollConfig,
    pub media_poll: PollConfig,
    pub build_poll_interval: Duration,
    pub build_timeout: Duration,
}

impl PipelineSettings {
    pub fn new(datasets: PipelineDatasets) -> Self {
        Self {
            branch_name: "master".to_string(),
            schedule_rid: None,
            event_job_rid: None,
            datasets,
            artifact_dir: PathBuf::from("."),
            text_poll: PollConfig::TEXT,
            chat_poll: PollConfig::CHAT,
            media_poll: PollConfig::MEDIA,
            build_poll_interval: BUILD_POLL_INTERVAL,
            build_timeout: BUILD_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            branch_name: config.foundry_branch.clone(),
            schedule_rid: config.schedule_rid.clone(),
            event_job_rid: config.event_job_rid.clone(),
            artifact_dir: config.artifact_dir.clone(),
            ..Self::new(config.datasets.clone())
        }
    }
}
