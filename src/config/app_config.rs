use serde::Deserialize;
use std::path::Path;

use crate::core::errors::{Result, WikitrackError};

/// Public Wikidata action API endpoint.
pub const DEFAULT_API_URL: &str = "https://www.wikidata.org/w/api.php";

/// Top-level configuration read from `{data_dir}/config.toml`.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSection,
    pub query: QuerySection,
    pub history: HistorySection,
}

impl AppConfig {
    /// Load the configuration, falling back to defaults when the file is absent.
    ///
    /// After parsing, validates the history filename so a config file cannot
    /// point history writes outside the data directory.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content).map_err(|e| WikitrackError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", config_path.display()),
        })?;

        crate::cli::context::validate_simple_filename(&config.history.file, "history file")?;

        if config.api.timeout_secs == 0 {
            return Err(WikitrackError::InvalidConfig {
                detail: "api.timeout_secs must be greater than zero".into(),
            });
        }
        if config.api.max_pages == 0 {
            return Err(WikitrackError::InvalidConfig {
                detail: "api.max_pages must be greater than zero".into(),
            });
        }

        Ok(config)
    }
}

/// The `[api]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Upper bound on continuation requests per list query.
    pub max_pages: usize,
    pub user_agent: Option<String>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            max_pages: 10,
            user_agent: None,
        }
    }
}

/// The `[query]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub default_limit: usize,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self { default_limit: 100 }
    }
}

/// The `[history]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    pub enabled: bool,
    pub file: String,
    pub max_entries: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            enabled: true,
            file: "history.json".to_string(),
            max_entries: 500,
        }
    }
}
