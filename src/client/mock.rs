//! In-memory [`AdminApi`] for unit tests

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{AdminApi, ApiError, ApiResult};
use crate::models::{
    AdminStats, BulkScrapeRequest, Category, DeleteResponse, Document, PredefinedSites,
    ScrapeRequest, ScrapeResponse, ScrapeResult, ScrapeSummary, SiteGroup, UploadResponse,
};

/// Records every call as a short string (`list`, `delete:<id>`, ...) and keeps
/// the document list in memory so reloads reflect uploads and deletes.
#[derive(Default)]
pub(crate) struct MockApi {
    pub documents: Mutex<Vec<Document>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_load: bool,
    pub fail_upload: bool,
}

impl MockApi {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self { documents: Mutex::new(documents), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn server_error() -> ApiError {
        ApiError::Status { status: StatusCode::INTERNAL_SERVER_ERROR, detail: "boom".to_string() }
    }
}

#[async_trait]
impl AdminApi for MockApi {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        self.record("list".to_string());
        if self.fail_load {
            return Err(Self::server_error());
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn stats(&self) -> ApiResult<AdminStats> {
        let documents = self.documents.lock().unwrap();
        let mut categories: Vec<String> =
            documents.iter().map(|d| d.category.as_str().to_string()).collect();
        categories.sort();
        categories.dedup();
        Ok(AdminStats {
            total_documents: documents.len() as u64,
            categories,
            ..AdminStats::default()
        })
    }

    async fn upload_document(&self, path: &Path, category: &Category) -> ApiResult<UploadResponse> {
        let filename = path.file_name().unwrap().to_string_lossy().into_owned();
        self.record(format!("upload:{}:{}", filename, category));
        if self.fail_upload {
            return Err(Self::server_error());
        }
        let mut documents = self.documents.lock().unwrap();
        let id = format!("{}", documents.len() + 100);
        documents.push(Document::new(id, filename.clone(), "uploaded", category.clone(), 8));
        Ok(UploadResponse {
            message: "ok".to_string(),
            filename,
            category: category.clone(),
            size: 8,
            file_type: None,
        })
    }

    async fn delete_document(&self, id: &str) -> ApiResult<DeleteResponse> {
        self.record(format!("delete:{}", id));
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                detail: format!("Document {} not found", id),
            });
        }
        Ok(DeleteResponse { message: "deleted".to_string(), deleted_id: id.to_string(), database_type: None })
    }

    async fn scrape_url(&self, request: &ScrapeRequest) -> ApiResult<ScrapeResponse> {
        self.record(format!("scrape:{}:{}", request.url, request.category));
        Ok(Self::scraped(std::slice::from_ref(&request.url)))
    }

    async fn scrape_bulk(&self, request: &BulkScrapeRequest) -> ApiResult<ScrapeResponse> {
        self.record(format!("bulk:{}:{}", request.urls.join(","), request.category));
        Ok(Self::scraped(&request.urls))
    }

    async fn predefined_sites(&self) -> ApiResult<PredefinedSites> {
        self.record("sites".to_string());
        Ok(PredefinedSites {
            groups: vec![
                SiteGroup {
                    name: "ireland".to_string(),
                    urls: vec!["https://www.courts.ie/".to_string()],
                },
                SiteGroup {
                    name: "ukraine".to_string(),
                    urls: vec!["https://court.gov.ua/".to_string(), "https://ccu.gov.ua/".to_string()],
                },
            ],
            error: None,
        })
    }
}

impl MockApi {
    /// Every URL scraped successfully
    fn scraped(urls: &[String]) -> ScrapeResponse {
        ScrapeResponse {
            message: "done".to_string(),
            results: urls
                .iter()
                .map(|url| ScrapeResult {
                    url: url.clone(),
                    title: "Page".to_string(),
                    success: true,
                    content_length: 42,
                    error: None,
                })
                .collect(),
            summary: ScrapeSummary {
                total_processed: urls.len() as u64,
                successful: urls.len() as u64,
                ..ScrapeSummary::default()
            },
        }
    }
}
