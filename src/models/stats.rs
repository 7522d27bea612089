use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate counters computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub total_chats: u64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub database_type: Option<String>,
    #[serde(default)]
    pub services_status: Option<Value>,
}

impl AdminStats {
    /// Number of distinct categories reported by the backend
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
