//! Pure Foundry REST API client.
//!
//! A minimal client for the parts of the Foundry platform the pipeline layer
//! needs: filesystem and media-set uploads, build and schedule orchestration,
//! and CSV table reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use foundry_client::{FoundryClient, FoundryConfig};
//!
//! let client = FoundryClient::new(FoundryConfig::new("tenant.example.com", token))?;
//!
//! client.upload_file(dataset_rid, "incoming/2024-01-01/notes.txt", bytes).await?;
//! let table = client.read_table(output_rid, None, None).await?;
//! ```

pub mod error;
pub mod media;
pub mod retry;
pub mod table;
pub mod types;

pub use error::{BuildAttemptError, FoundryError, Result};
pub use media::{extract_media_item_rid, RidSource, MEDIA_ITEM_RID_PREFIX};
pub use retry::RetryPolicy;
pub use table::Table;
pub use types::{Build, BuildOptions, BuildStatus, CreateBuildRequest, ScheduleRun};

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use types::ErrorEnvelope;

/// Prefix of filesystem-backed dataset identifiers.
pub const DATASET_RID_PREFIX: &str = "ri.foundry.main.dataset.";

const OCTET_STREAM: &str = "application/octet-stream";

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct FoundryConfig {
    pub hostname: String,
    pub token: String,
    pub branch_name: String,
    pub https_proxy: Option<String>,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl FoundryConfig {
    pub fn new(hostname: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            token: token.into(),
            branch_name: "master".to_string(),
            https_proxy: None,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Turn a hostname setting into `scheme://host[:port]` without a trailing slash.
///
/// Accepts `tenant.example.com`, `https://tenant.example.com/`, and
/// `gateway.svc.cluster.local:8443`.
pub fn normalize_base_url(host: &str) -> Result<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(FoundryError::Config("FOUNDRY_HOSTNAME is empty".into()));
    }

    let base = match host.split_once("://") {
        Some((scheme, rest)) => {
            let scheme = if scheme.is_empty() { "https" } else { scheme };
            let authority = rest.split('/').next().unwrap_or_default();
            format!("{}://{}", scheme, authority)
        }
        None => format!("https://{}", host),
    };

    Ok(base.trim_end_matches('/').to_string())
}

pub struct FoundryClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    branch_name: String,
    retry: RetryPolicy,
}

impl FoundryClient {
    pub fn new(config: FoundryConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.hostname)?;

        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);
        if let Some(proxy) = config.https_proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::https(proxy)
                .map_err(|e| FoundryError::Config(format!("invalid HTTPS_PROXY: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| FoundryError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: config.token,
            branch_name: config.branch_name,
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Send with bearer auth, retrying per the transport policy.
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let outcome = build().bearer_auth(&self.token).send().await;
            let can_retry = attempt < self.retry.max_retries;

            match outcome {
                Ok(resp) if can_retry && self.retry.should_retry_status(resp.status()) => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        url = %resp.url(),
                        status = resp.status().as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying Foundry request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(resp) => return Ok(resp),
                Err(e) if can_retry && self.retry.should_retry_error(&e) => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(error = %e, attempt, "Retrying Foundry request after transport error");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Map non-2xx responses to `FoundryError::Api` with the body as context.
    async fn ensure_success(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(FoundryError::Api {
            status: status.as_u16(),
            message: body,
        })
    }

    /// Upload raw bytes into a filesystem-backed dataset at `file_path`.
    pub async fn upload_file(&self, dataset_rid: &str, file_path: &str, bytes: Vec<u8>) -> Result<()> {
        if !dataset_rid.starts_with(DATASET_RID_PREFIX) {
            return Err(FoundryError::InvalidRid(format!(
                "upload_file expects a filesystem dataset rid, got '{}'; use upload_media_item for media sets",
                dataset_rid
            )));
        }

        let url = format!("{}/api/v1/datasets/{}/files:upload", self.base_url, dataset_rid);
        tracing::info!(dataset_rid, file_path, size = bytes.len(), "Uploading file");

        let resp = self
            .send(|| {
                self.client
                    .post(&url)
                    .query(&[("filePath", file_path)])
                    .header(CONTENT_TYPE, OCTET_STREAM)
                    .body(bytes.clone())
            })
            .await?;
        Self::ensure_success(resp).await?;

        tracing::info!(dataset_rid, file_path, "Upload complete");
        Ok(())
    }

    /// Upload bytes as a media item and return the created item's rid when the
    /// response reveals it.
    pub async fn upload_media_item(
        &self,
        media_set_rid: &str,
        media_item_path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>> {
        let url = format!("{}/api/v2/mediasets/{}/items", self.base_url, media_set_rid);
        tracing::info!(media_set_rid, media_item_path, size = bytes.len(), "Uploading media item");

        let resp = self
            .send(|| {
                self.client
                    .post(&url)
                    .query(&[
                        ("mediaItemPath", media_item_path),
                        ("preview", "true"),
                        ("branchName", self.branch_name.as_str()),
                    ])
                    .header(CONTENT_TYPE, OCTET_STREAM)
                    .body(bytes.clone())
            })
            .await?;
        let resp = Self::ensure_success(resp).await?;

        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.unwrap_or_default();

        match extract_media_item_rid(&body, location.as_deref()) {
            Some((rid, source)) => {
                tracing::info!(media_item_rid = %rid, ?source, "Media upload complete");
                Ok(Some(rid))
            }
            None => {
                tracing::warn!(
                    media_set_rid,
                    media_item_path,
                    "Upload succeeded but media item rid was not found in response; matching by file name will be less reliable"
                );
                Ok(None)
            }
        }
    }

    /// Create a one-off build, trying each payload variant in order.
    ///
    /// Stops at the first 2xx response that carries a build rid.
    pub async fn create_build(&self, target_rids: &[String], options: &BuildOptions) -> Result<String> {
        let url = format!("{}/api/v2/orchestration/builds/create", self.base_url);
        let mut attempts = Vec::new();

        for (i, body) in CreateBuildRequest::variants(target_rids, options)
            .into_iter()
            .enumerate()
        {
            let variant = i + 1;
            tracing::info!(variant, ?target_rids, "Creating build");

            let resp = self.send(|| self.client.post(&url).json(&body)).await?;
            let status = resp.status();

            if status.is_success() {
                let build: Build = resp
                    .json()
                    .await
                    .map_err(|e| FoundryError::Parse(format!("builds/create response: {}", e)))?;
                match build.rid {
                    Some(rid) => {
                        tracing::info!(build_rid = %rid, variant, "Build started");
                        return Ok(rid);
                    }
                    None => {
                        tracing::error!(variant, "builds/create returned no rid");
                        attempts.push(BuildAttemptError {
                            variant,
                            status: status.as_u16(),
                            error_code: None,
                            error_name: Some("MissingBuildRid".into()),
                            error_instance_id: None,
                        });
                        continue;
                    }
                }
            }

            let text = resp.text().await.unwrap_or_default();
            let envelope: ErrorEnvelope = serde_json::from_str(&text).unwrap_or_default();
            tracing::error!(
                variant,
                status = status.as_u16(),
                error_code = envelope.error_code.as_deref().unwrap_or(""),
                error_name = envelope.error_name.as_deref().unwrap_or(""),
                body = %text,
                "builds/create variant rejected"
            );
            attempts.push(BuildAttemptError {
                variant,
                status: status.as_u16(),
                error_code: envelope.error_code,
                error_name: envelope.error_name,
                error_instance_id: envelope.error_instance_id,
            });
        }

        Err(FoundryError::BuildCreate { attempts })
    }

    /// Create a one-off build targeting orchestration jobs.
    pub async fn create_build_for_jobs(&self, job_rids: &[String], options: &BuildOptions) -> Result<String> {
        let url = format!("{}/api/v2/orchestration/builds/create", self.base_url);
        let body = CreateBuildRequest::for_jobs(job_rids, options);
        tracing::info!(?job_rids, "Creating build for jobs");

        let resp = self.send(|| self.client.post(&url).json(&body)).await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let envelope: ErrorEnvelope = serde_json::from_str(&text).unwrap_or_default();
            return Err(FoundryError::BuildCreate {
                attempts: vec![BuildAttemptError {
                    variant: 1,
                    status: status.as_u16(),
                    error_code: envelope.error_code,
                    error_name: envelope.error_name,
                    error_instance_id: envelope.error_instance_id,
                }],
            });
        }

        let build: Build = resp
            .json()
            .await
            .map_err(|e| FoundryError::Parse(format!("builds/create response: {}", e)))?;
        let rid = build
            .rid
            .ok_or_else(|| FoundryError::Parse("builds/create (jobs) returned no rid".into()))?;
        tracing::info!(build_rid = %rid, ?job_rids, "Build started for jobs");
        Ok(rid)
    }

    pub async fn get_build(&self, build_rid: &str) -> Result<Build> {
        let url = format!("{}/api/v2/orchestration/builds/{}", self.base_url, build_rid);
        let resp = self.send(|| self.client.get(&url)).await?;
        let resp = Self::ensure_success(resp).await?;
        resp.json()
            .await
            .map_err(|e| FoundryError::Parse(format!("build response: {}", e)))
    }

    /// Poll a build until it reaches a terminal state.
    pub async fn wait_for_build(&self, build_rid: &str, poll: Duration, timeout: Duration) -> Result<()> {
        let start = tokio::time::Instant::now();
        loop {
            let build = self.get_build(build_rid).await?;
            let status = BuildStatus::parse(build.status.as_deref().unwrap_or_default());
            tracing::info!(build_rid, ?status, "Build status");

            match status {
                BuildStatus::Succeeded => return Ok(()),
                BuildStatus::Failed | BuildStatus::Canceled => {
                    return Err(FoundryError::BuildFailed {
                        build_rid: build_rid.to_string(),
                        status: build.status.unwrap_or_default(),
                    });
                }
                _ => {}
            }

            if start.elapsed() > timeout {
                return Err(FoundryError::BuildTimeout {
                    build_rid: build_rid.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Fire a schedule run. Success means the run was accepted, not finished.
    pub async fn run_schedule(&self, schedule_rid: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/api/v2/orchestration/schedules/{}/run",
            self.base_url, schedule_rid
        );
        let resp = self.send(|| self.client.post(&url)).await?;
        let resp = Self::ensure_success(resp).await?;

        let run: ScheduleRun = resp
            .json()
            .await
            .map_err(|e| FoundryError::Parse(format!("schedule run response: {}", e)))?;
        tracing::info!(schedule_rid, run_rid = ?run.rid, "Schedule run started");
        Ok(run.rid)
    }

    pub async fn list_schedule_runs(&self, schedule_rid: &str) -> Result<Vec<ScheduleRun>> {
        let url = format!(
            "{}/api/v2/orchestration/schedules/{}/runs",
            self.base_url, schedule_rid
        );
        let resp = self.send(|| self.client.get(&url)).await?;
        let resp = Self::ensure_success(resp).await?;

        let value: Value = resp
            .json()
            .await
            .map_err(|e| FoundryError::Parse(format!("schedule runs response: {}", e)))?;
        let data = value.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
        serde_json::from_value(data).map_err(|e| FoundryError::Parse(e.to_string()))
    }

    /// Job rids that build `dataset_rid` on the configured branch, newest first.
    pub async fn list_dataset_jobs(&self, dataset_rid: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/v2/datasets/{}/jobs", self.base_url, dataset_rid);
        let resp = self
            .send(|| {
                self.client.get(&url).query(&[
                    ("branchName", self.branch_name.as_str()),
                    ("orderBy", "CREATED_DESC"),
                    ("limit", "50"),
                ])
            })
            .await?;
        let resp = Self::ensure_success(resp).await?;

        let value: Value = resp
            .json()
            .await
            .map_err(|e| FoundryError::Parse(format!("dataset jobs response: {}", e)))?;
        Ok(job_rids_from(&value))
    }

    /// Read a whole table as CSV and decode it.
    pub async fn read_table(
        &self,
        dataset_rid: &str,
        columns: Option<&[String]>,
        row_limit: Option<usize>,
    ) -> Result<Table> {
        let url = format!("{}/api/v2/datasets/{}/readTable", self.base_url, dataset_rid);

        let mut query: Vec<(&str, String)> = vec![
            ("format", "CSV".to_string()),
            ("branchName", self.branch_name.clone()),
        ];
        for column in columns.unwrap_or_default() {
            query.push(("columns", column.clone()));
        }
        if let Some(limit) = row_limit {
            query.push(("rowLimit", limit.to_string()));
        }

        let resp = self.send(|| self.client.get(&url).query(&query)).await?;
        let resp = Self::ensure_success(resp).await?;
        let bytes = resp.bytes().await?;

        let table = Table::from_csv(&bytes)?;
        tracing::debug!(dataset_rid, rows = table.len(), columns = ?table.columns(), "Read table");
        Ok(table)
    }
}

/// Jobs come back as a bare list or wrapped in `data` / `results`.
fn job_rids_from(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        other => other
            .get("data")
            .or_else(|| other.get("results"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };

    items
        .iter()
        .filter_map(|job| job.get("rid").or_else(|| job.get("jobRid")))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
