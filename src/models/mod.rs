//! Data models for the document-corpus admin API.
//!
//! This module defines the records exchanged with the backend:
//!
//! - [`Document`] - A stored content record with its metadata
//! - [`Category`] - Classification from the fixed category set
//! - [`AdminStats`] - Server-computed aggregate counters
//! - [`UploadResponse`], [`DeleteResponse`] - Mutation acknowledgements
//! - [`ScrapeRequest`], [`BulkScrapeRequest`], [`ScrapeResponse`] - Website scraping round trip
//! - [`PredefinedSites`] - Site lists the backend suggests for scraping
//!
//! Backend payloads are loosely typed, so ids and timestamps go through the
//! custom deserializers in the `deserializers` module.

pub mod category;
pub mod deserializers;
pub mod document;
pub mod scrape;
pub mod stats;

pub use category::Category;
pub use document::{DeleteResponse, Document, DocumentsResponse, UploadResponse};
pub use scrape::{
    BulkScrapeRequest, DEFAULT_BULK_DELAY, MAX_BULK_URLS, PredefinedSites, ScrapeRequest,
    ScrapeResponse, ScrapeResult, ScrapeSummary, SiteGroup,
};
pub use stats::AdminStats;
