// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use foundry_client::Table;
use sqlx::PgPool;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BasePipelinePlatform, BaseWebScraper, ScrapedPage, ServerDeps};
use crate::domains::pipeline::PipelineSettings;

/// Build a table from string literals
pub fn mock_table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

// =============================================================================
// Mock Pipeline Platform
// =============================================================================

/// What one `read_table` call returns
#[derive(Debug, Clone)]
pub enum MockRead {
    Rows(Table),
    Fail(String),
    /// Never completes; only the caller's deadline ends it
    Hang,
}

/// Arguments captured from an upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub target_rid: String,
    pub path: String,
    pub bytes: Vec<u8>,
}

impl UploadCall {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub struct MockPipelinePlatform {
    /// Queued reads per dataset rid; the last one repeats
    reads: Arc<Mutex<HashMap<String, VecDeque<MockRead>>>>,
    read_calls: Arc<Mutex<Vec<String>>>,
    uploads: Arc<Mutex<Vec<UploadCall>>>,
    media_uploads: Arc<Mutex<Vec<UploadCall>>>,
    media_item_rid: Arc<Mutex<Option<String>>>,
    upload_error: Arc<Mutex<Option<String>>>,
    schedule_runs: Arc<Mutex<Vec<String>>>,
    schedule_error: Arc<Mutex<Option<String>>>,
    jobs: Arc<Mutex<Vec<String>>>,
    job_list_calls: Arc<Mutex<Vec<String>>>,
    builds: Arc<Mutex<Vec<Vec<String>>>>,
    build_waits: Arc<Mutex<Vec<String>>>,
    build_error: Arc<Mutex<Option<String>>>,
}

impl MockPipelinePlatform {
    pub fn new() -> Self {
        Self {
            reads: Arc::new(Mutex::new(HashMap::new())),
            read_calls: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            media_uploads: Arc::new(Mutex::new(Vec::new())),
            media_item_rid: Arc::new(Mutex::new(None)),
            upload_error: Arc::new(Mutex::new(None)),
            schedule_runs: Arc::new(Mutex::new(Vec::new())),
            schedule_error: Arc::new(Mutex::new(None)),
            jobs: Arc::new(Mutex::new(Vec::new())),
            job_list_calls: Arc::new(Mutex::new(Vec::new())),
            builds: Arc::new(Mutex::new(Vec::new())),
            build_waits: Arc::new(Mutex::new(Vec::new())),
            build_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a read result for a dataset
    pub fn with_read(self, dataset_rid: &str, read: MockRead) -> Self {
        self.reads
            .lock()
            .unwrap()
            .entry(dataset_rid.to_string())
            .or_default()
            .push_back(read);
        self
    }

    /// Queue a table for a dataset
    pub fn with_table(self, dataset_rid: &str, table: Table) -> Self {
        self.with_read(dataset_rid, MockRead::Rows(table))
    }

    /// Rid reported by media uploads (none by default)
    pub fn with_media_item_rid(self, rid: &str) -> Self {
        *self.media_item_rid.lock().unwrap() = Some(rid.to_string());
        self
    }

    /// Jobs returned when listing dataset jobs
    pub fn with_jobs(self, jobs: &[&str]) -> Self {
        *self.jobs.lock().unwrap() = jobs.iter().map(|j| j.to_string()).collect();
        self
    }

    /// Make every upload fail
    pub fn failing_uploads(self, message: &str) -> Self {
        *self.upload_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make every schedule run fail
    pub fn failing_schedule(self, message: &str) -> Self {
        *self.schedule_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make build waits fail
    pub fn failing_build(self, message: &str) -> Self {
        *self.build_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn read_calls(&self) -> Vec<String> {
        self.read_calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<UploadCall> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn media_uploads(&self) -> Vec<UploadCall> {
        self.media_uploads.lock().unwrap().clone()
    }

    pub fn schedule_runs(&self) -> Vec<String> {
        self.schedule_runs.lock().unwrap().clone()
    }

    pub fn job_list_calls(&self) -> Vec<String> {
        self.job_list_calls.lock().unwrap().clone()
    }

    pub fn builds(&self) -> Vec<Vec<String>> {
        self.builds.lock().unwrap().clone()
    }

    pub fn build_waits(&self) -> Vec<String> {
        self.build_waits.lock().unwrap().clone()
    }

    fn next_read(&self, dataset_rid: &str) -> MockRead {
        let mut reads = self.reads.lock().unwrap();
        match reads.get_mut(dataset_rid) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(MockRead::Rows(Table::default())),
            Some(queue) => queue.front().cloned().unwrap_or(MockRead::Rows(Table::default())),
            None => MockRead::Rows(Table::default()),
        }
    }
}

impl Default for MockPipelinePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePipelinePlatform for MockPipelinePlatform {
    async fn upload_file(&self, dataset_rid: &str, file_path: &str, bytes: Vec<u8>) -> Result<()> {
        if let Some(message) = self.upload_error.lock().unwrap().clone() {
            anyhow::bail!("{}", message);
        }
        self.uploads.lock().unwrap().push(UploadCall {
            target_rid: dataset_rid.to_string(),
            path: file_path.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn upload_media_item(
        &self,
        media_set_rid: &str,
        media_item_path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>> {
        if let Some(message) = self.upload_error.lock().unwrap().clone() {
            anyhow::bail!("{}", message);
        }
        self.media_uploads.lock().unwrap().push(UploadCall {
            target_rid: media_set_rid.to_string(),
            path: media_item_path.to_string(),
            bytes,
        });
        Ok(self.media_item_rid.lock().unwrap().clone())
    }

    async fn run_schedule(&self, schedule_rid: &str) -> Result<Option<String>> {
        self.schedule_runs.lock().unwrap().push(schedule_rid.to_string());
        if let Some(message) = self.schedule_error.lock().unwrap().clone() {
            anyhow::bail!("{}", message);
        }
        Ok(Some("ri.scheduler.main.run.mock".to_string()))
    }

    async fn list_dataset_jobs(&self, dataset_rid: &str) -> Result<Vec<String>> {
        self.job_list_calls.lock().unwrap().push(dataset_rid.to_string());
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn create_build_for_jobs(&self, job_rids: &[String]) -> Result<String> {
        self.builds.lock().unwrap().push(job_rids.to_vec());
        Ok("ri.foundry.main.build.mock".to_string())
    }

    async fn wait_for_build(&self, build_rid: &str, _poll: Duration, _timeout: Duration) -> Result<()> {
        self.build_waits.lock().unwrap().push(build_rid.to_string());
        if let Some(message) = self.build_error.lock().unwrap().clone() {
            anyhow::bail!("{}", message);
        }
        Ok(())
    }

    async fn read_table(&self, dataset_rid: &str) -> Result<Table> {
        self.read_calls.lock().unwrap().push(dataset_rid.to_string());
        match self.next_read(dataset_rid) {
            MockRead::Rows(table) => Ok(table),
            MockRead::Fail(message) => anyhow::bail!("{}", message),
            MockRead::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future completed")
            }
        }
    }
}

// =============================================================================
// Mock Web Scraper
// =============================================================================

pub struct MockWebScraper {
    /// Pages keyed by exact URL
    pages: Arc<Mutex<HashMap<String, ScrapedPage>>>,
    scrape_calls: Arc<Mutex<Vec<String>>>,
}

impl MockWebScraper {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            scrape_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `html` at `url`; text is derived by the real parser
    pub fn with_html(self, url: &str, html: &str) -> Self {
        if let Ok(page) = super::SimpleScraper::parse_page(url, html.to_string()) {
            self.pages.lock().unwrap().insert(url.to_string(), page);
        }
        self
    }

    /// Serve a prepared page at its URL
    pub fn with_page(self, page: ScrapedPage) -> Self {
        self.pages.lock().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Get all URLs that were scraped
    pub fn scrape_calls(&self) -> Vec<String> {
        self.scrape_calls.lock().unwrap().clone()
    }

    /// Check if a URL was scraped
    pub fn was_scraped(&self, url: &str) -> bool {
        self.scrape_calls.lock().unwrap().iter().any(|u| u == url)
    }
}

impl Default for MockWebScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseWebScraper for MockWebScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        // Record the call
        self.scrape_calls.lock().unwrap().push(url.to_string());

        match self.pages.lock().unwrap().get(url) {
            Some(page) => Ok(page.clone()),
            None => anyhow::bail!("HTTP 404 Not Found for {}", url),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub platform: Arc<MockPipelinePlatform>,
    pub web_scraper: Arc<MockWebScraper>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            platform: Arc::new(MockPipelinePlatform::new()),
            web_scraper: Arc::new(MockWebScraper::new()),
        }
    }

    /// Set a mock pipeline platform
    pub fn mock_platform(mut self, platform: MockPipelinePlatform) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    /// Set a mock web scraper
    pub fn mock_scraper(mut self, scraper: MockWebScraper) -> Self {
        self.web_scraper = Arc::new(scraper);
        self
    }

    /// ServerDeps sharing these mocks; the mocks stay inspectable afterwards
    pub fn server_deps(&self, db_pool: PgPool, settings: PipelineSettings) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.platform.clone(),
            self.web_scraper.clone(),
            settings,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
