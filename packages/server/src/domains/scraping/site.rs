//! Multi-page site scraping on top of `BaseWebScraper`.

use anyhow::{Context, Result};
use serde::Serialize;

use super::heuristics;
use crate::domains::organization::OrgType;
use crate::kernel::{BaseWebScraper, ScrapedPage};

/// Sub pages read when building a text artifact
pub const SITE_TEXT_SUBPAGES: usize = 4;

/// Sub pages read when profiling an organization
pub const ORGANIZATION_SUBPAGES: usize = 3;

/// Directory fields recovered from an organization's website
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedOrgData {
    pub name: String,
    pub description: Option<String>,
    pub org_type: Option<OrgType>,
    pub contact_email: Option<String>,
    pub application_requirements: Option<String>,
    pub application_deadline: Option<String>,
}

/// Main page followed by up to `max_subpages` internal pages.
///
/// The main page must load; sub page failures are logged and skipped.
pub async fn scrape_pages(
    scraper: &dyn BaseWebScraper,
    url: &str,
    max_subpages: usize,
) -> Result<Vec<ScrapedPage>> {
    let main = scraper
        .scrape(url)
        .await
        .with_context(|| format!("Failed to scrape {}", url))?;

    let sub_urls: Vec<String> = main
        .links
        .iter()
        .filter(|link| **link != main.url)
        .take(max_subpages)
        .cloned()
        .collect();

    let mut pages = vec![main];
    for sub_url in sub_urls {
        match scraper.scrape(&sub_url).await {
            Ok(page) => pages.push(page),
            Err(e) => tracing::warn!(url = %sub_url, error = %e, "Failed to scrape sub page"),
        }
    }

    tracing::info!(url, pages = pages.len(), "Scraped site");
    Ok(pages)
}

/// Visible text of the main page and its sub pages, one page per line
pub async fn scrape_site_text(
    scraper: &dyn BaseWebScraper,
    url: &str,
    max_subpages: usize,
) -> Result<String> {
    let pages = scrape_pages(scraper, url, max_subpages).await?;
    Ok(pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Profile an organization from its website
pub async fn scrape_organization(scraper: &dyn BaseWebScraper, url: &str) -> Result<ScrapedOrgData> {
    let pages = scrape_pages(scraper, url, ORGANIZATION_SUBPAGES).await?;
    let main = &pages[0];

    let text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let name = heuristics::extract_name(&main.html);
    let org_type = heuristics::detect_org_type(&text, &name);

    Ok(ScrapedOrgData {
        description: heuristics::extract_description(&text, &main.html),
        contact_email: heuristics::extract_email(&text)
            .or_else(|| heuristics::extract_email(&main.html)),
        application_requirements: heuristics::extract_requirements(&text),
        application_deadline: heuristics::extract_deadline(&text),
        org_type,
        name,
    })
}
