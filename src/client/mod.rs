//! Access to the document-corpus admin REST API.
//!
//! The dashboard and the CLI talk to the backend only through the [`AdminApi`]
//! trait, so both can run against an in-memory mock in tests. [`HttpAdminClient`]
//! is the production implementation on top of `reqwest`.

mod error;
mod http;
#[cfg(test)]
pub(crate) mod mock;

use std::path::Path;

use async_trait::async_trait;
pub use error::{ApiError, ApiResult, extract_detail};
pub use http::HttpAdminClient;

use crate::models::{
    AdminStats, BulkScrapeRequest, Category, DeleteResponse, Document, PredefinedSites,
    ScrapeRequest, ScrapeResponse, UploadResponse,
};

/// Operations the admin backend exposes
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// `GET /api/admin/documents`
    async fn list_documents(&self) -> ApiResult<Vec<Document>>;

    /// `GET /api/admin/stats`
    async fn stats(&self) -> ApiResult<AdminStats>;

    /// `POST /api/admin/documents/upload` with the file at `path`
    async fn upload_document(&self, path: &Path, category: &Category)
    -> ApiResult<UploadResponse>;

    /// `DELETE /api/admin/documents/{id}`
    async fn delete_document(&self, id: &str) -> ApiResult<DeleteResponse>;

    /// `POST /api/admin/scrape/url`
    async fn scrape_url(&self, request: &ScrapeRequest) -> ApiResult<ScrapeResponse>;

    /// `POST /api/admin/scrape/bulk`
    async fn scrape_bulk(&self, request: &BulkScrapeRequest) -> ApiResult<ScrapeResponse>;

    /// `GET /api/admin/predefined-sites`
    async fn predefined_sites(&self) -> ApiResult<PredefinedSites>;
}

/// Fetch the document list and the stats concurrently.
///
/// Fails as a whole if either request fails, so callers never end up with
/// documents from one load and stats from another.
pub async fn load_dashboard(api: &dyn AdminApi) -> ApiResult<(Vec<Document>, AdminStats)> {
    tokio::try_join!(api.list_documents(), api.stats())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;

    struct CountingApi {
        calls: AtomicUsize,
        fail_stats: bool,
    }

    #[async_trait]
    impl AdminApi for CountingApi {
        async fn list_documents(&self) -> ApiResult<Vec<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn stats(&self) -> ApiResult<AdminStats> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_stats {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "boom".to_string(),
                });
            }
            Ok(AdminStats { total_documents: 7, ..AdminStats::default() })
        }

        async fn upload_document(&self, _: &Path, _: &Category) -> ApiResult<UploadResponse> {
            unreachable!("not used")
        }

        async fn delete_document(&self, _: &str) -> ApiResult<DeleteResponse> {
            unreachable!("not used")
        }

        async fn scrape_url(&self, _: &ScrapeRequest) -> ApiResult<ScrapeResponse> {
            unreachable!("not used")
        }

        async fn scrape_bulk(&self, _: &BulkScrapeRequest) -> ApiResult<ScrapeResponse> {
            unreachable!("not used")
        }

        async fn predefined_sites(&self) -> ApiResult<PredefinedSites> {
            unreachable!("not used")
        }
    }

    #[tokio::test]
    async fn test_load_dashboard_issues_both_requests() {
        let api = CountingApi { calls: AtomicUsize::new(0), fail_stats: false };
        let (documents, stats) = load_dashboard(&api).await.unwrap();

        assert!(documents.is_empty());
        assert_eq!(stats.total_documents, 7);
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_dashboard_fails_when_stats_fail() {
        let api = CountingApi { calls: AtomicUsize::new(0), fail_stats: true };
        let err = load_dashboard(&api).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
