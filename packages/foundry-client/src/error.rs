//! Error types for the Foundry client.

use thiserror::Error;

/// Result type for Foundry client operations.
pub type Result<T> = std::result::Result<T, FoundryError>;

/// One rejected `builds/create` payload variant.
#[derive(Debug, Clone)]
pub struct BuildAttemptError {
    pub variant: usize,
    pub status: u16,
    pub error_code: Option<String>,
    pub error_name: Option<String>,
    pub error_instance_id: Option<String>,
}

impl std::fmt::Display for BuildAttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "variant {} [{}] {} ({}) id={}",
            self.variant,
            self.status,
            self.error_name.as_deref().unwrap_or(""),
            self.error_code.as_deref().unwrap_or(""),
            self.error_instance_id.as_deref().unwrap_or("")
        )
    }
}

/// Foundry client errors.
#[derive(Debug, Error)]
pub enum FoundryError {
    /// Configuration error (empty hostname, bad proxy)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport error after retries were exhausted
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// Resource identifier of the wrong kind for the operation
    #[error("Invalid resource identifier: {0}")]
    InvalidRid(String),

    /// Every `builds/create` payload variant was rejected
    #[error("builds/create failed for all variants: {}", format_attempts(.attempts))]
    BuildCreate { attempts: Vec<BuildAttemptError> },

    /// Build reached a terminal state other than SUCCEEDED
    #[error("Build {build_rid} ended {status}")]
    BuildFailed { build_rid: String, status: String },

    /// Build did not finish within its budget
    #[error("Build {build_rid} timed out after {timeout_secs}s")]
    BuildTimeout { build_rid: String, timeout_secs: u64 },

    /// Table payload could not be decoded as CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Unexpected response shape
    #[error("Parse error: {0}")]
    Parse(String),
}

fn format_attempts(attempts: &[BuildAttemptError]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
