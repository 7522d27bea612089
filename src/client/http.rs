use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::AdminApi;
use super::error::{ApiError, ApiResult, extract_detail};
use crate::models::{
    AdminStats, BulkScrapeRequest, Category, DeleteResponse, Document, DocumentsResponse,
    MAX_BULK_URLS, PredefinedSites, ScrapeRequest, ScrapeResponse, UploadResponse,
};

const DOCUMENTS_PATH: &str = "api/admin/documents";
const UPLOAD_PATH: &str = "api/admin/documents/upload";
const STATS_PATH: &str = "api/admin/stats";
const SCRAPE_URL_PATH: &str = "api/admin/scrape/url";
const SCRAPE_BULK_PATH: &str = "api/admin/scrape/bulk";
const PREDEFINED_SITES_PATH: &str = "api/admin/predefined-sites";

// Characters escaped when a document id becomes a single path segment
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'[')
    .add(b']');

/// Encode a document id so it stays one path segment
pub(crate) fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT_ENCODE_SET).to_string()
}

/// Admin API client over HTTP.
///
/// No timeouts and no retries: a slow backend keeps the request pending and a
/// failed one surfaces immediately as an [`ApiError`].
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    client: Client,
    base_url: Url,
}

impl HttpAdminClient {
    /// Create a client for the backend rooted at `base_url`
    pub fn new(base_url: Url) -> ApiResult<Self> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{} (expected an http or https URL)",
                base_url
            )));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base_url: with_trailing_slash(base_url) })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Endpoint with a `_t` query parameter so intermediaries never serve a stale list
    fn cache_busted(&self, path: &str) -> ApiResult<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("_t", &Utc::now().timestamp_millis().to_string());
        Ok(url)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Turn a response into `T`, mapping non-2xx statuses to [`ApiError::Status`]
async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status { status, detail: extract_detail(&body) });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let url = self.cache_busted(DOCUMENTS_PATH)?;
        debug!("GET {}", url);

        let response: DocumentsResponse = decode(self.client.get(url).send().await?).await?;
        debug!(
            "Loaded {} documents (database: {})",
            response.documents.len(),
            response.database_type.as_deref().unwrap_or("unknown")
        );
        Ok(response.documents)
    }

    async fn stats(&self) -> ApiResult<AdminStats> {
        let url = self.cache_busted(STATS_PATH)?;
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }

    async fn upload_document(
        &self,
        path: &Path,
        category: &Category,
    ) -> ApiResult<UploadResponse> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        info!("Uploading {} ({} bytes) as {}", file_name, bytes.len(), category);

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("category", category.as_str().to_string());

        let url = self.endpoint(UPLOAD_PATH)?;
        decode(self.client.post(url).multipart(form).send().await?).await
    }

    async fn delete_document(&self, id: &str) -> ApiResult<DeleteResponse> {
        let url = self.endpoint(&format!("{}/{}", DOCUMENTS_PATH, encode_segment(id)))?;
        info!("DELETE {}", url);
        decode(self.client.delete(url).send().await?).await
    }

    async fn scrape_url(&self, request: &ScrapeRequest) -> ApiResult<ScrapeResponse> {
        let url = self.endpoint(SCRAPE_URL_PATH)?;
        info!("Submitting {} for scraping as {}", request.url, request.category);
        decode(self.client.post(url).json(request).send().await?).await
    }

    async fn scrape_bulk(&self, request: &BulkScrapeRequest) -> ApiResult<ScrapeResponse> {
        if request.urls.is_empty() {
            return Err(ApiError::InvalidRequest("No URLs to scrape".to_string()));
        }
        if request.urls.len() > MAX_BULK_URLS {
            return Err(ApiError::InvalidRequest(format!(
                "At most {} URLs can be scraped at once, got {}",
                MAX_BULK_URLS,
                request.urls.len()
            )));
        }

        let url = self.endpoint(SCRAPE_BULK_PATH)?;
        info!(
            "Submitting {} URLs for scraping as {} ({}s apart)",
            request.urls.len(),
            request.category,
            request.delay
        );
        decode(self.client.post(url).json(request).send().await?).await
    }

    async fn predefined_sites(&self) -> ApiResult<PredefinedSites> {
        let url = self.cache_busted(PREDEFINED_SITES_PATH)?;
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }
}
