// Business domains
pub mod organization;
pub mod pipeline;
pub mod profile;
pub mod school;
pub mod scrape_request;
pub mod scraping;
