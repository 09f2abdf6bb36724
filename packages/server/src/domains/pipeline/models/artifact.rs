use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::domains::pipeline::PipelineError;

/// Folder that pipeline submissions land in
pub const INCOMING_FOLDER: &str = "incoming";

/// Folder for essay analysis submissions
pub const CHAT_ANALYSIS_FOLDER: &str = "chat_analysis";

/// File name used when a scraped site is submitted without one
pub const DEFAULT_SCRAPE_FILE_NAME: &str = "scraped_results.txt";

/// Where the bytes of a submission come from
#[derive(Debug, Clone)]
pub enum SourceArtifact {
    /// Scrape the site (main page plus a few sub pages) into a text file
    Url { url: String, file_name: Option<String> },
    /// A file already on local disk
    LocalFile(PathBuf),
    /// Bytes supplied by the caller
    Inline { file_name: String, bytes: Vec<u8> },
}

/// `{folder}/{YYYY-MM-DD}/{file_name}`
pub fn dated_path(folder: &str, date: NaiveDate, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        folder.trim_matches('/'),
        date.format("%Y-%m-%d"),
        file_name
    )
}

/// Dated path for today's local date
pub fn dated_path_today(folder: &str, file_name: &str) -> String {
    dated_path(folder, Local::now().date_naive(), file_name)
}

/// Accept only a bare file name; no separators, no parent references.
pub fn validate_file_name(file_name: &str) -> Result<&str, PipelineError> {
    let trimmed = file_name.trim();
    let bad = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains('/')
        || trimmed.contains('\\');
    if bad {
        return Err(PipelineError::InvalidFileName(file_name.to_string()));
    }
    Ok(trimmed)
}
