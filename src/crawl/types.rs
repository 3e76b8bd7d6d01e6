use serde::{Deserialize, Serialize};

// Sentinels carried on every result; missing metadata is never fatal.
pub const NO_TITLE: &str = "No title found";
pub const NO_CONTENT: &str = "No content found";
pub const UNKNOWN_VERSION: &str = "Unknown version";
pub const UNKNOWN_DATE: &str = "Unknown release date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Failed,
}

/// One record per crawled URL, written verbatim into the output JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub library_name: String,
    pub url: String,
    pub version: String,
    pub title: String,
    pub release_date: String,
    pub content: String,
    pub crawl_status: CrawlStatus,
}

impl CrawlResult {
    /// Terminal failure record after the retry budget is exhausted.
    pub fn failed(library_name: &str, url: &str, diagnostic: String) -> Self {
        Self {
            library_name: library_name.to_string(),
            url: url.to_string(),
            version: UNKNOWN_VERSION.to_string(),
            title: "Crawl failed".to_string(),
            release_date: UNKNOWN_DATE.to_string(),
            content: diagnostic,
            crawl_status: CrawlStatus::Failed,
        }
    }
}

// Plan envelope types
#[derive(Serialize)]
pub struct LibrarySample { pub library: String, pub urls: Vec<String> }

#[derive(Serialize)]
pub struct CrawlPlan { pub libraries: usize, pub urls: usize, pub concurrency: usize, pub sample: Vec<LibrarySample> }

// Apply/result envelope types
#[derive(Serialize)]
pub struct LibrarySummary { pub library: String, pub succeeded: usize, pub failed: usize, pub duplicate_contents: usize }

#[derive(Serialize)]
pub struct CrawlTotals { pub libraries: usize, pub succeeded: usize, pub failed: usize }

#[derive(Serialize)]
pub struct CrawlApply { pub totals: CrawlTotals, pub per_library: Vec<LibrarySummary>, pub out: String, pub appended: Option<usize>, pub finished_at: String }
