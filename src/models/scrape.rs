use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Category;

/// Most URLs the backend accepts in one bulk request
pub const MAX_BULK_URLS: usize = 20;

/// Seconds the backend waits between pages of a bulk scrape unless told otherwise
pub const DEFAULT_BULK_DELAY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    pub category: Category,
}

/// Body of `POST /api/admin/scrape/bulk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkScrapeRequest {
    pub urls: Vec<String>,
    pub category: Category,
    /// Pause between pages, in seconds
    pub delay: f64,
}

/// A named list of sites the backend suggests for scraping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteGroup {
    pub name: String,
    pub urls: Vec<String>,
}

/// Response of `GET /api/admin/predefined-sites`.
///
/// The backend answers with one key per group (`{"ukraine": [...], "ireland":
/// [...], "total": {...}}`). Every key holding a list of strings becomes a
/// group, sorted by name; `error` is kept, anything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PredefinedSites {
    pub groups: Vec<SiteGroup>,
    pub error: Option<String>,
}

impl PredefinedSites {
    pub fn group(&self, name: &str) -> Option<&SiteGroup> {
        self.groups.iter().find(|group| group.name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.urls.is_empty())
    }
}

impl From<Map<String, Value>> for PredefinedSites {
    fn from(map: Map<String, Value>) -> Self {
        let mut sites = PredefinedSites::default();
        for (key, value) in map {
            match value {
                Value::String(message) if key == "error" => sites.error = Some(message),
                Value::Array(items) => sites.groups.push(SiteGroup {
                    name: key,
                    urls: items.into_iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
                }),
                _ => {}
            }
        }
        sites.groups.sort_by(|a, b| a.name.cmp(&b.name));
        sites
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub success: bool,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSummary {
    #[serde(default)]
    pub total_processed: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<ScrapeResult>,
    #[serde(default)]
    pub summary: ScrapeSummary,
}

impl ScrapeResponse {
    /// True when every reported URL was scraped and stored
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.success)
    }
}
