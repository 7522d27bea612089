use anyhow::{Result, bail};
use url::Url;

use crate::models::{
    BulkScrapeRequest, Category, DEFAULT_BULK_DELAY, MAX_BULK_URLS, PredefinedSites,
    ScrapeRequest, ScrapeResponse,
};

const MAX_URL_INPUT: usize = 2048;

/// Accept only absolute `http`/`https` URLs with a host
pub fn validate_scrape_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Enter a URL to scrape");
    }
    let url = Url::parse(trimmed).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", trimmed, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Only http and https URLs can be scraped");
    }
    if url.host_str().is_none_or(str::is_empty) {
        bail!("URL has no host");
    }
    Ok(url)
}

/// Validate a batch for `/scrape/bulk`: at least one URL, at most
/// [`MAX_BULK_URLS`], each an http(s) URL
pub fn validate_bulk_urls<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    if raw.is_empty() {
        bail!("Add at least one URL to scrape");
    }
    if raw.len() > MAX_BULK_URLS {
        bail!("At most {} URLs can be scraped at once, got {}", MAX_BULK_URLS, raw.len());
    }
    raw.iter().map(|url| validate_scrape_url(url.as_ref()).map(|url| url.to_string())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMode {
    Single,
    Bulk,
}

/// What the form asks the backend to do
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeJob {
    Single(ScrapeRequest),
    Bulk(BulkScrapeRequest),
}

#[derive(Debug, Default)]
enum SitesState {
    #[default]
    NotRequested,
    Loading,
    Loaded(PredefinedSites),
    Failed(String),
}

/// Form state of the scraper tab.
///
/// Single mode scrapes the URL in the input field. Bulk mode collects URLs
/// into a list (typed one per Enter, pasted several at once, or taken from a
/// predefined site group) and Enter on an empty field submits the list.
#[derive(Debug)]
pub struct ScraperForm {
    mode: ScrapeMode,
    url_input: String,
    bulk_urls: Vec<String>,
    category: Category,
    sites: SitesState,
    site_group: Option<usize>,
    in_flight: bool,
    error: Option<String>,
    last_response: Option<ScrapeResponse>,
}

impl Default for ScraperForm {
    fn default() -> Self {
        Self {
            mode: ScrapeMode::Single,
            url_input: String::new(),
            bulk_urls: Vec::new(),
            category: Category::Scraped,
            sites: SitesState::NotRequested,
            site_group: None,
            in_flight: false,
            error: None,
            last_response: None,
        }
    }
}

impl ScraperForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ScrapeMode {
        self.mode
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn bulk_urls(&self) -> &[String] {
        &self.bulk_urls
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_response(&self) -> Option<&ScrapeResponse> {
        self.last_response.as_ref()
    }

    /// Name of the predefined group the bulk list came from
    pub fn site_group_name(&self) -> Option<&str> {
        match (&self.sites, self.site_group) {
            (SitesState::Loaded(sites), Some(idx)) => sites.groups.get(idx).map(|g| g.name.as_str()),
            _ => None,
        }
    }

    /// One-line status of the predefined site list
    pub fn sites_status(&self) -> String {
        match &self.sites {
            SitesState::NotRequested => "not loaded".to_string(),
            SitesState::Loading => "loading…".to_string(),
            SitesState::Failed(message) => format!("unavailable ({})", message),
            SitesState::Loaded(sites) if sites.is_empty() => match &sites.error {
                Some(message) => format!("none ({})", message),
                None => "none".to_string(),
            },
            SitesState::Loaded(sites) => sites
                .groups
                .iter()
                .map(|g| format!("{} ({})", g.name, g.urls.len()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Switch between single and bulk mode.
    ///
    /// Returns true the first time bulk mode is entered, when the caller
    /// should fetch the predefined sites and hand them to [`Self::set_sites`].
    pub fn toggle_mode(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.error = None;
        self.mode = match self.mode {
            ScrapeMode::Single => ScrapeMode::Bulk,
            ScrapeMode::Bulk => ScrapeMode::Single,
        };
        if self.mode == ScrapeMode::Bulk && matches!(self.sites, SitesState::NotRequested) {
            self.sites = SitesState::Loading;
            return true;
        }
        false
    }

    pub fn set_sites(&mut self, outcome: Result<PredefinedSites, String>) {
        self.site_group = None;
        self.sites = match outcome {
            Ok(sites) => SitesState::Loaded(sites),
            Err(message) => SitesState::Failed(message),
        };
    }

    /// Replace the bulk list with the next predefined group's URLs.
    ///
    /// Returns the group name, or `None` when no sites are loaded.
    pub fn next_site_group(&mut self) -> Option<String> {
        if self.in_flight || self.mode != ScrapeMode::Bulk {
            return None;
        }
        let SitesState::Loaded(sites) = &self.sites else {
            self.error = Some("Predefined sites are not available".to_string());
            return None;
        };
        let candidates: Vec<usize> =
            (0..sites.groups.len()).filter(|&i| !sites.groups[i].urls.is_empty()).collect();
        if candidates.is_empty() {
            self.error = Some("No predefined sites".to_string());
            return None;
        }
        let next = match self.site_group {
            Some(current) => candidates.iter().copied().find(|&i| i > current).unwrap_or(candidates[0]),
            None => candidates[0],
        };
        let group = &sites.groups[next];
        self.bulk_urls = group.urls.iter().take(MAX_BULK_URLS).cloned().collect();
        let name = group.name.clone();
        self.site_group = Some(next);
        self.error = None;
        Some(name)
    }

    pub fn input_char(&mut self, c: char) {
        if !self.in_flight && self.url_input.len() < MAX_URL_INPUT {
            self.url_input.push(c);
            self.error = None;
        }
    }

    /// Paste: one URL in single mode; in bulk mode every whitespace- or
    /// comma-separated URL is added to the list
    pub fn insert_text(&mut self, text: &str) {
        if self.in_flight {
            return;
        }
        match self.mode {
            ScrapeMode::Single => {
                for c in text.trim().chars().filter(|c| !c.is_control()) {
                    self.input_char(c);
                }
            }
            ScrapeMode::Bulk => {
                for token in text.split(|c: char| c.is_whitespace() || c == ',') {
                    if !token.is_empty() && !self.add_bulk_url(token) {
                        break;
                    }
                }
            }
        }
    }

    pub fn delete_char(&mut self) {
        if self.in_flight {
            return;
        }
        if self.url_input.pop().is_none() && self.mode == ScrapeMode::Bulk {
            self.bulk_urls.pop();
            self.site_group = None;
        }
    }

    /// Clear the URL field, then the bulk list; false when both were empty
    pub fn clear_input(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        if !self.url_input.is_empty() {
            self.url_input.clear();
        } else if self.mode == ScrapeMode::Bulk && !self.bulk_urls.is_empty() {
            self.bulk_urls.clear();
            self.site_group = None;
        } else {
            return false;
        }
        self.error = None;
        true
    }

    pub fn cycle_category(&mut self, forward: bool) {
        if !self.in_flight {
            self.category = if forward { self.category.next() } else { self.category.prev() };
        }
    }

    /// Validate and append one URL to the bulk list
    fn add_bulk_url(&mut self, raw: &str) -> bool {
        if self.bulk_urls.len() >= MAX_BULK_URLS {
            self.error = Some(format!("At most {} URLs can be scraped at once", MAX_BULK_URLS));
            return false;
        }
        match validate_scrape_url(raw) {
            Ok(url) => {
                self.bulk_urls.push(url.to_string());
                self.site_group = None;
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Validated job, or `None` with an inline error set.
    ///
    /// In bulk mode a non-empty input field is added to the list instead of
    /// submitting.
    pub fn submit(&mut self) -> Option<ScrapeJob> {
        if self.in_flight {
            return None;
        }
        let job = match self.mode {
            ScrapeMode::Single => validate_scrape_url(&self.url_input).map(|url| {
                ScrapeJob::Single(ScrapeRequest { url: url.to_string(), category: self.category.clone() })
            }),
            ScrapeMode::Bulk => {
                if !self.url_input.trim().is_empty() {
                    let input = std::mem::take(&mut self.url_input);
                    if !self.add_bulk_url(&input) {
                        self.url_input = input;
                    }
                    return None;
                }
                validate_bulk_urls(&self.bulk_urls).map(|urls| {
                    ScrapeJob::Bulk(BulkScrapeRequest {
                        urls,
                        category: self.category.clone(),
                        delay: DEFAULT_BULK_DELAY,
                    })
                })
            }
        };
        match job {
            Ok(job) => {
                self.in_flight = true;
                self.error = None;
                Some(job)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Record the backend outcome; a success clears the URL field and list
    pub fn finish(&mut self, outcome: Result<ScrapeResponse, String>) {
        self.in_flight = false;
        match outcome {
            Ok(response) => {
                self.url_input.clear();
                self.bulk_urls.clear();
                self.site_group = None;
                self.error = None;
                self.last_response = Some(response);
            }
            Err(message) => self.error = Some(message),
        }
    }
}
