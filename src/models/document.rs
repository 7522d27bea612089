use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Category;

fn default_source() -> String {
    "Unknown".to_string()
}

fn default_original_url() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(
        default = "crate::models::deserializers::generate_document_id",
        deserialize_with = "crate::models::deserializers::deserialize_document_id"
    )]
    pub id: String,
    pub filename: String,
    #[serde(default, deserialize_with = "crate::models::deserializers::null_as_default")]
    pub content: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_original_url")]
    pub original_url: String,
    #[serde(default, deserialize_with = "crate::models::deserializers::null_as_default")]
    pub word_count: u64,
    #[serde(default, deserialize_with = "crate::models::deserializers::null_as_default")]
    pub chunks_count: u64,
    #[serde(default, deserialize_with = "crate::models::deserializers::deserialize_added_at")]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::models::deserializers::null_as_default")]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Document with the given core fields and defaults for the rest
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            content: content.into(),
            category,
            size,
            source: default_source(),
            original_url: default_original_url(),
            word_count: 0,
            chunks_count: 0,
            added_at: None,
            metadata: Map::new(),
        }
    }

    /// Size in kilobytes with one decimal, as shown in the viewer header
    pub fn size_kb(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub database_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub filename: String,
    pub category: Category,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
    pub deleted_id: String,
    #[serde(default)]
    pub database_type: Option<String>,
}
