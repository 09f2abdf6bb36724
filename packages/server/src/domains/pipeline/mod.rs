pub mod activities;
pub mod matching;
pub mod models;
pub mod poller;

pub use matching::UnsupportedSchema;
pub use models::*;
pub use poller::{poll_until_match, MatchPolicy, PollConfig, PollOutcome, PollState};

/// Pipeline-level failures that callers are expected to act on
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid file name '{0}': expected a bare file name")]
    InvalidFileName(String),

    #[error(transparent)]
    UnsupportedSchema(#[from] UnsupportedSchema),

    #[error("media item rid is required")]
    MissingMediaItemRid,

    #[error("no jobs found for the events dataset on branch '{branch}'; set EVENT_JOB_RID")]
    NoEventJobs { branch: String },

    #[error("{0}")]
    InvalidRequest(String),
}
