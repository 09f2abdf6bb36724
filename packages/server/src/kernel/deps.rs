//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. External services sit behind `Base*` traits so tests can swap
//! in mocks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use foundry_client::{BuildOptions, FoundryClient, Table};
use sqlx::PgPool;

use crate::domains::pipeline::PipelineSettings;
use crate::kernel::{BasePipelinePlatform, BaseWebScraper};

// =============================================================================
// FoundryClient Adapter (implements BasePipelinePlatform trait)
// =============================================================================

/// Wrapper around FoundryClient that implements BasePipelinePlatform trait
pub struct FoundryAdapter {
    client: Arc<FoundryClient>,
    build_options: BuildOptions,
}

impl FoundryAdapter {
    pub fn new(client: Arc<FoundryClient>) -> Self {
        let build_options = BuildOptions::for_branch(client.branch_name());
        Self {
            client,
            build_options,
        }
    }
}

#[async_trait]
impl BasePipelinePlatform for FoundryAdapter {
    async fn upload_file(&self, dataset_rid: &str, file_path: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .upload_file(dataset_rid, file_path, bytes)
            .await
            .map_err(Into::into)
    }

    async fn upload_media_item(
        &self,
        media_set_rid: &str,
        media_item_path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>> {
        self.client
            .upload_media_item(media_set_rid, media_item_path, bytes)
            .await
            .map_err(Into::into)
    }

    async fn run_schedule(&self, schedule_rid: &str) -> Result<Option<String>> {
        self.client
            .run_schedule(schedule_rid)
            .await
            .map_err(Into::into)
    }

    async fn list_dataset_jobs(&self, dataset_rid: &str) -> Result<Vec<String>> {
        self.client
            .list_dataset_jobs(dataset_rid)
            .await
            .map_err(Into::into)
    }

    async fn create_build_for_jobs(&self, job_rids: &[String]) -> Result<String> {
        self.client
            .create_build_for_jobs(job_rids, &self.build_options)
            .await
            .map_err(Into::into)
    }

    async fn wait_for_build(&self, build_rid: &str, poll: Duration, timeout: Duration) -> Result<()> {
        self.client
            .wait_for_build(build_rid, poll, timeout)
            .await
            .map_err(Into::into)
    }

    async fn read_table(&self, dataset_rid: &str) -> Result<Table> {
        self.client
            .read_table(dataset_rid, None, None)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub platform: Arc<dyn BasePipelinePlatform>,
    pub web_scraper: Arc<dyn BaseWebScraper>,
    pub pipeline: PipelineSettings,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        platform: Arc<dyn BasePipelinePlatform>,
        web_scraper: Arc<dyn BaseWebScraper>,
        pipeline: PipelineSettings,
    ) -> Self {
        Self {
            db_pool,
            platform,
            web_scraper,
            pipeline,
        }
    }
}
