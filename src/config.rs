use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::download::default_download_dir;

/// Backend address used when neither `--base-url` nor the env var is set
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Environment variable holding the backend address
pub const BASE_URL_ENV: &str = "CORPUS_ADMIN_URL";
/// Environment variable overriding the download directory
pub const DOWNLOAD_DIR_ENV: &str = "CORPUS_ADMIN_DOWNLOAD_DIR";
/// How long a dashboard notification stays visible
pub const NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

/// Resolved runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub base_url: Url,
    pub download_dir: PathBuf,
    pub notification_duration: Duration,
}

impl AdminConfig {
    /// Build the configuration from optional overrides, filling in defaults
    pub fn resolve(base_url: Option<&str>, download_dir: Option<PathBuf>) -> Result<Self> {
        let raw = base_url.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_BASE_URL);
        let base_url =
            Url::parse(raw).with_context(|| format!("Invalid backend URL '{}'", raw))?;

        Ok(Self {
            base_url,
            download_dir: download_dir.unwrap_or_else(default_download_dir),
            notification_duration: NOTIFICATION_DURATION,
        })
    }
}
