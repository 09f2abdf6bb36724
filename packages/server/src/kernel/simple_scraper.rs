//! Simple web scraper - local HTTP + HTML parsing
//!
//! This implementation:
//! - Uses reqwest for HTTP requests
//! - Uses scraper crate for HTML parsing
//! - Reduces a page to its title, visible text and internal links
//!
//! Limitations:
//! - No JavaScript rendering (use for static HTML sites only)

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{BaseWebScraper, ScrapedPage};

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Simple web scraper using reqwest + scraper
pub struct SimpleScraper {
    client: reqwest::Client,
}

impl SimpleScraper {
    pub fn new() -> Result<Self> {
        // Use a browser-like User-Agent to avoid bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }

    /// Extract title from HTML document
    fn extract_title(document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;
        document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Visible text of the document, whitespace collapsed
    fn extract_text(document: &Html) -> String {
        let root = Selector::parse("body")
            .ok()
            .and_then(|body| document.select(&body).next())
            .unwrap_or_else(|| document.root_element());

        let mut words = Vec::new();
        for node in root.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
        words.join(" ")
    }

    /// Internal links: `href` values rooted at `/`, joined onto the page URL
    fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
        let Ok(link_selector) = Selector::parse("a[href]") else {
            return vec![];
        };

        let mut seen = HashSet::new();
        document
            .select(&link_selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| href.starts_with('/') && !href.starts_with("//"))
            .filter_map(|href| base_url.join(href).ok())
            .map(|mut url| {
                url.set_fragment(None);
                url.to_string()
            })
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Normalize URL by adding https:// if no scheme is present
    fn normalize_url(url: &str) -> String {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }

    /// Parse already-fetched HTML into a page
    pub fn parse_page(url: &str, html: String) -> Result<ScrapedPage> {
        let base_url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
        let document = Html::parse_document(&html);

        let title = Self::extract_title(&document);
        let text = Self::extract_text(&document);
        let links = Self::extract_links(&document, &base_url);

        Ok(ScrapedPage {
            url: url.to_string(),
            title,
            html,
            text,
            links,
        })
    }
}

#[async_trait]
impl BaseWebScraper for SimpleScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let url = Self::normalize_url(url);
        debug!(url = %url, "Scraping page");

        let html = self.fetch_html(&url).await?;
        let page = Self::parse_page(&url, html)?;

        if page.text.len() < 100 {
            warn!(url = %url, "Page has minimal content");
        }

        Ok(page)
    }
}
