//! Shared test utilities for integration tests
//!
//! [`FakeBackend`] serves the admin REST routes from memory on an ephemeral
//! port and records what the client sent, so both the library client and the
//! compiled binary can be exercised end to end.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

/// One multipart upload as the server received it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceivedUpload {
    pub filename: Option<String>,
    pub category: Option<String>,
    pub content: Vec<u8>,
}

/// Everything the client sent, in arrival order
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    /// `_t` query values of the GET requests (`None` when missing)
    pub cache_busters: Vec<Option<String>>,
    pub uploads: Vec<ReceivedUpload>,
    pub deleted_ids: Vec<String>,
    pub scrape_requests: Vec<Value>,
    pub bulk_requests: Vec<Value>,
    /// Number of predefined-sites lookups
    pub site_lookups: usize,
}

#[derive(Default)]
struct BackendState {
    documents: Vec<Value>,
    recorded: Recorded,
    fail_list: bool,
    reject_uploads: bool,
}

type SharedState = Arc<Mutex<BackendState>>;

/// Handle on a running fake backend
pub struct FakeBackend {
    addr: SocketAddr,
    state: SharedState,
}

impl FakeBackend {
    /// Start a backend serving `documents` on 127.0.0.1
    pub fn start(documents: Vec<Value>) -> Self {
        Self::start_with(BackendState { documents, ..BackendState::default() })
    }

    /// Start a backend whose document listing fails with a FastAPI error body
    pub fn failing_list() -> Self {
        Self::start_with(BackendState { fail_list: true, ..BackendState::default() })
    }

    /// Start a backend that rejects every upload
    pub fn rejecting_uploads(documents: Vec<Value>) -> Self {
        Self::start_with(BackendState { documents, reject_uploads: true, ..BackendState::default() })
    }

    fn start_with(state: BackendState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = router(Arc::clone(&state));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.set_nonblocking(true).expect("Failed to set non-blocking");
        let addr = listener.local_addr().expect("No local address");

        // Own runtime on its own thread so sync tests (spawning the binary) work too
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("Failed to adopt listener");
                axum::serve(listener, app).await.expect("Server error");
            });
        });

        Self { addr, state }
    }

    /// Base URL to hand to the client or `--base-url`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Recorded {
        self.state.lock().unwrap().recorded.clone()
    }

    /// Ids of the documents the backend still holds
    pub fn document_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().documents.iter().map(id_of).collect()
    }
}

fn id_of(doc: &Value) -> String {
    match &doc["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/admin/documents", get(list_documents))
        .route("/api/admin/documents/upload", post(upload_document))
        .route("/api/admin/documents/:id", delete(delete_document))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/scrape/url", post(scrape_url))
        .route("/api/admin/scrape/bulk", post(scrape_bulk))
        .route("/api/admin/predefined-sites", get(predefined_sites))
        .with_state(state)
}

async fn list_documents(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.recorded.cache_busters.push(params.get("_t").cloned());

    if state.fail_list {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Document store unavailable");
    }

    (
        StatusCode::OK,
        Json(json!({
            "documents": state.documents,
            "total": state.documents.len(),
            "message": "Retrieved documents",
            "database_type": "ChromaDB",
        })),
    )
}

async fn stats(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.recorded.cache_busters.push(params.get("_t").cloned());

    let mut categories: Vec<String> = state
        .documents
        .iter()
        .filter_map(|doc| doc["category"].as_str().map(str::to_string))
        .collect();
    categories.sort();
    categories.dedup();

    (
        StatusCode::OK,
        Json(json!({
            "total_documents": state.documents.len(),
            "total_chats": 7,
            "categories": categories,
            "database_type": "ChromaDB",
        })),
    )
}

async fn upload_document(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut upload = ReceivedUpload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.filename = field.file_name().map(str::to_string);
                upload.content = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            Some("category") => upload.category = field.text().await.ok(),
            _ => {}
        }
    }

    let mut state = state.lock().unwrap();
    state.recorded.uploads.push(upload.clone());

    if state.reject_uploads {
        return detail(StatusCode::BAD_REQUEST, "Unsupported file type");
    }

    let filename = upload.filename.unwrap_or_else(|| "upload".to_string());
    let category = upload.category.unwrap_or_else(|| "general".to_string());
    let id = format!("up-{}", state.documents.len() + 1);
    let content = String::from_utf8_lossy(&upload.content).into_owned();
    state.documents.push(document_json(&id, &filename, &content, &category, upload.content.len() as u64));

    (
        StatusCode::OK,
        Json(json!({
            "message": "Document uploaded successfully",
            "filename": filename,
            "category": category,
            "size": upload.content.len(),
            "file_type": "text/plain",
        })),
    )
}

async fn delete_document(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.recorded.deleted_ids.push(id.clone());

    let before = state.documents.len();
    state.documents.retain(|doc| id_of(doc) != id);
    if state.documents.len() == before {
        return detail(StatusCode::NOT_FOUND, "Document not found");
    }

    (
        StatusCode::OK,
        Json(json!({
            "message": "Document deleted successfully",
            "deleted_id": id,
            "database_type": "ChromaDB",
        })),
    )
}

async fn scrape_url(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.recorded.scrape_requests.push(body.clone());

    let url = body["url"].as_str().unwrap_or_default().to_string();
    let category = body["category"].as_str().unwrap_or("scraped").to_string();

    // Hosts under .invalid simulate a page the backend could not fetch
    if url.contains(".invalid") {
        return (
            StatusCode::OK,
            Json(json!({
                "message": "URL scraped but processing failed",
                "results": [{"url": url, "title": "", "success": false,
                             "content_length": 0, "error": "Failed to fetch page"}],
                "summary": {"total_processed": 1, "successful": 0, "failed": 1,
                            "category": category},
            })),
        );
    }

    let id = format!("scraped-{}", state.documents.len() + 1);
    state.documents.push(document_json(&id, "Example page", "scraped text", &category, 12));

    (
        StatusCode::OK,
        Json(json!({
            "message": "URL scraped and processed successfully",
            "results": [{"url": url, "title": "Example page", "success": true,
                         "content_length": 12, "error": null}],
            "summary": {"total_processed": 1, "successful": 1, "failed": 0, "category": category},
        })),
    )
}

async fn scrape_bulk(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.recorded.bulk_requests.push(body.clone());

    let urls: Vec<String> = body["urls"]
        .as_array()
        .map(|urls| urls.iter().filter_map(|u| u.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    if urls.len() > 20 {
        return detail(StatusCode::BAD_REQUEST, "Maximum 20 URLs allowed per request");
    }
    let category = body["category"].as_str().unwrap_or("scraped").to_string();

    let mut results = Vec::new();
    let mut successful = 0;
    for url in &urls {
        if url.contains(".invalid") {
            results.push(json!({"url": url, "title": "Failed", "success": false,
                                "content_length": 0, "error": "No content or content too short"}));
            continue;
        }
        successful += 1;
        let id = format!("scraped-{}", state.documents.len() + 1);
        state.documents.push(document_json(&id, url, "scraped text", &category, 12));
        results.push(json!({"url": url, "title": "Example page", "success": true,
                            "content_length": 12, "error": null}));
    }

    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Processed {}/{} URLs successfully", successful, results.len()),
            "results": results,
            "summary": {"total_processed": urls.len(), "successful": successful,
                        "failed": urls.len() - successful, "category": category},
        })),
    )
}

async fn predefined_sites(State(state): State<SharedState>) -> Json<Value> {
    state.lock().unwrap().recorded.site_lookups += 1;
    Json(json!({
        "ukraine": ["https://court.example/ua", "https://rada.example/laws"],
        "ireland": ["https://courts.example/ie"],
        "total": {"ukraine": 2, "ireland": 1},
    }))
}

/// A document as the backend serializes it
pub fn document_json(id: &str, filename: &str, content: &str, category: &str, size: u64) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "content": content,
        "category": category,
        "size": size,
        "source": "File Upload",
        "original_url": "N/A",
        "word_count": content.split_whitespace().count(),
        "chunks_count": 1,
        "added_at": 1_714_557_600.25,
        "metadata": {"uploaded_by": "admin"},
    })
}

/// Three documents covering two categories and distinct sizes
pub fn sample_documents() -> Vec<Value> {
    vec![
        document_json("doc-1", "constitution.txt", "We the people", "legislation", 2048),
        document_json("doc-2", "ruling.md", "The court finds for the plaintiff", "jurisprudence", 512),
        document_json("doc-3", "Budget.pdf", "Annual spending report", "government", 4096),
    ]
}
