//! Backend location, resolved once at startup.

use anyhow::{Result, anyhow, bail};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the AQI backend lives.
///
/// Can be read from a JSON file:
/// ```json
/// { "base_url": "http://localhost:8000" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    base_url: String,
}

#[derive(Deserialize)]
struct ConfigFile {
    base_url: String,
}

impl DashboardConfig {
    /// Validates `base_url` as an absolute http(s) URL. A trailing `/` is
    /// dropped.
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = reqwest::Url::parse(trimmed)
            .map_err(|e| anyhow!("Invalid base URL {:?}: {}", base_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            bail!("Base URL must use http or https, got {:?}", url.scheme());
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path, e))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path, e))?;
        Self::new(&file.base_url)
    }

    /// A config file wins over the command-line/environment value.
    pub fn resolve(config_path: Option<&str>, base_url: &str) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Self::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
