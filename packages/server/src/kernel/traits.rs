// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Matching, polling and scraping heuristics live in the domains and use these traits.
//
// Naming convention: Base* for trait names (e.g., BasePipelinePlatform)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use foundry_client::Table;

// =============================================================================
// Pipeline Platform Trait (Infrastructure - batch-processing platform)
// =============================================================================

#[async_trait]
pub trait BasePipelinePlatform: Send + Sync {
    /// Write bytes into a filesystem dataset at `file_path`
    async fn upload_file(&self, dataset_rid: &str, file_path: &str, bytes: Vec<u8>) -> Result<()>;

    /// Upload a media item; returns the created item's rid when the platform reports it
    async fn upload_media_item(
        &self,
        media_set_rid: &str,
        media_item_path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>>;

    /// Fire a schedule run (accepted, not finished)
    async fn run_schedule(&self, schedule_rid: &str) -> Result<Option<String>>;

    /// Job rids that build a dataset, newest first
    async fn list_dataset_jobs(&self, dataset_rid: &str) -> Result<Vec<String>>;

    /// Start a one-off build of the given jobs; returns the build rid
    async fn create_build_for_jobs(&self, job_rids: &[String]) -> Result<String>;

    /// Block until the build succeeds; errors on failure or timeout
    async fn wait_for_build(&self, build_rid: &str, poll: Duration, timeout: Duration) -> Result<()>;

    /// Read a whole output table
    async fn read_table(&self, dataset_rid: &str) -> Result<Table>;
}

// =============================================================================
// Web Scraper Trait (Infrastructure)
// =============================================================================

/// A fetched page reduced to what the heuristics need
#[derive(Debug, Clone, Default)]
pub struct ScrapedPage {
    pub url: String,
    pub title: Option<String>,
    /// Raw HTML as served
    pub html: String,
    /// Visible body text, whitespace collapsed to single spaces
    pub text: String,
    /// Same-site links found on the page, absolute, deduplicated, in document order
    pub links: Vec<String>,
}

#[async_trait]
pub trait BaseWebScraper: Send + Sync {
    /// Fetch and parse a single page
    async fn scrape(&self, url: &str) -> Result<ScrapedPage>;
}
