use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Options shared by every `builds/create` payload.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub branch_name: String,
    pub force_build: bool,
    pub retry_count: u32,
    pub retry_backoff_seconds: u64,
}

impl BuildOptions {
    pub fn for_branch(branch_name: impl Into<String>) -> Self {
        Self {
            branch_name: branch_name.into(),
            force_build: true,
            retry_count: 0,
            retry_backoff_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetryBackoffDuration {
    pub unit: &'static str,
    pub value: u64,
}

/// Build target as accepted by the orchestration API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuildTarget {
    Manual {
        #[serde(rename = "targetRids")]
        target_rids: Vec<String>,
    },
    Datasets {
        #[serde(rename = "datasetRids")]
        dataset_rids: Vec<String>,
    },
    Jobs {
        #[serde(rename = "jobRids")]
        job_rids: Vec<String>,
    },
}

/// Body of `POST /api/v2/orchestration/builds/create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildRequest {
    pub branch_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_branches: Option<Vec<String>>,
    pub force_build: bool,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_duration: Option<RetryBackoffDuration>,
    pub abort_on_failure: bool,
    pub target: BuildTarget,
}

impl CreateBuildRequest {
    fn base(options: &BuildOptions, target: BuildTarget) -> Self {
        Self {
            branch_name: options.branch_name.clone(),
            fallback_branches: None,
            force_build: options.force_build,
            retry_count: options.retry_count,
            retry_backoff_duration: None,
            abort_on_failure: false,
            target,
        }
    }

    /// Payload shapes tried in order; tenants differ in which they accept.
    ///
    /// A: manual target with fallback branches and backoff duration.
    /// B: manual target, no fallback branches, no backoff duration.
    /// C: datasets target, no backoff duration.
    pub fn variants(target_rids: &[String], options: &BuildOptions) -> Vec<Self> {
        let manual = BuildTarget::Manual {
            target_rids: target_rids.to_vec(),
        };

        let mut a = Self::base(options, manual.clone());
        a.fallback_branches = Some(vec![options.branch_name.clone()]);
        a.retry_backoff_duration = Some(RetryBackoffDuration {
            unit: "SECONDS",
            value: options.retry_backoff_seconds,
        });

        let b = Self::base(options, manual);

        let c = Self::base(
            options,
            BuildTarget::Datasets {
                dataset_rids: target_rids.to_vec(),
            },
        );

        vec![a, b, c]
    }

    /// Payload targeting orchestration jobs directly.
    pub fn for_jobs(job_rids: &[String], options: &BuildOptions) -> Self {
        let mut request = Self::base(
            options,
            BuildTarget::Jobs {
                job_rids: job_rids.to_vec(),
            },
        );
        request.fallback_branches = Some(vec![options.branch_name.clone()]);
        request.retry_backoff_duration = Some(RetryBackoffDuration {
            unit: "SECONDS",
            value: options.retry_backoff_seconds,
        });
        request
    }
}

/// Build metadata returned by create/get.
#[derive(Debug, Clone, Deserialize)]
pub struct Build {
    pub rid: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "createdTime")]
    pub created_time: Option<DateTime<Utc>>,
}

/// Build lifecycle as reported by the orchestration API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Running,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl BuildStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "RUNNING" => BuildStatus::Running,
            "SUCCEEDED" => BuildStatus::Succeeded,
            "FAILED" => BuildStatus::Failed,
            "CANCELED" => BuildStatus::Canceled,
            other => BuildStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildStatus::Succeeded | BuildStatus::Failed | BuildStatus::Canceled
        )
    }
}

/// A schedule run (`schedules/{rid}/run` and `schedules/{rid}/runs`).
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRun {
    pub rid: Option<String>,
    #[serde(rename = "createdTime")]
    pub created_time: Option<DateTime<Utc>>,
}

/// Error envelope returned by the platform on failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error_code: Option<String>,
    pub error_name: Option<String>,
    pub error_instance_id: Option<String>,
}
