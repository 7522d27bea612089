//! Corpus Admin - manage a document corpus behind a REST backend
//!
//! This library provides the pieces of an admin dashboard for a document store
//! whose persistence, indexing and scraping live in a separate backend:
//!
//! - Typed access to the admin REST API ([`client::AdminApi`], [`HttpAdminClient`])
//! - The document model with lenient deserialization of backend payloads
//! - Client-side search, category filtering and stable sorting ([`derive_view`])
//! - Local download and clipboard export of document content
//! - An interactive terminal dashboard and a scriptable command line
//!
//! # Example
//!
//! ```no_run
//! use corpus_admin::{HttpAdminClient, ViewCriteria, client::AdminApi, filter_documents};
//! use url::Url;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = HttpAdminClient::new(Url::parse("http://localhost:8000")?)?;
//! let documents = client.list_documents().await?;
//! let criteria = ViewCriteria::new().with_search("constitution");
//! for doc in filter_documents(&documents, &criteria) {
//!     println!("{} ({} bytes)", doc.filename, doc.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod clipboard;
pub mod config;
pub mod download;
pub mod filters;
pub mod logging;
pub mod models;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use client::{ApiError, HttpAdminClient, load_dashboard};
pub use config::AdminConfig;
pub use filters::{ViewCriteria, derive_view, filter_documents};
pub use models::{AdminStats, Category, Document};
