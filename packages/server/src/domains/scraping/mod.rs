//! Website scraping for organization profiles and pipeline text artifacts.

pub mod heuristics;
pub mod site;

pub use heuristics::UNKNOWN_ORGANIZATION;
pub use site::{
    scrape_organization, scrape_pages, scrape_site_text, ScrapedOrgData, ORGANIZATION_SUBPAGES,
    SITE_TEXT_SUBPAGES,
};
