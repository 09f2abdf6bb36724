//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (SCRAPE_REQUEST_CRON, every 15 minutes by default)
//!     │
//!     └─► ScrapeRequest::find_pending()
//!             └─► For each request → process_scrape_request()
//! ```

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::scrape_request::activities::process_pending_requests;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, scrape_request_cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let scrape_deps = deps.clone();
    let scrape_job = Job::new_async(scrape_request_cron, move |_uuid, _lock| {
        let deps = scrape_deps.clone();
        Box::pin(async move {
            if let Err(e) = run_pending_scrape_requests(&deps).await {
                tracing::error!("Pending scrape request task failed: {}", e);
            }
        })
    })?;

    scheduler.add(scrape_job).await?;
    scheduler.start().await?;

    tracing::info!(
        cron = scrape_request_cron,
        "Scheduled tasks started (pending scrape requests)"
    );
    Ok(scheduler)
}

/// Work through scrape requests that are still pending
async fn run_pending_scrape_requests(deps: &ServerDeps) -> Result<()> {
    tracing::info!("Running pending scrape request task");

    let processed = process_pending_requests(deps).await?;

    if processed == 0 {
        tracing::info!("No pending scrape requests");
    } else {
        tracing::info!("Processed {} pending scrape requests", processed);
    }

    Ok(())
}
