use std::path::{Path, PathBuf};

use tokio::runtime::Runtime;

use crate::adapters::history::json_history_store::JsonHistoryStore;
use crate::adapters::wikidata::client::WikidataClient;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::tracking_entry::NewTrackingEntry;
use crate::core::services::history_service::HistoryService;

/// Default data directory: the platform data dir plus `wikitrack`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wikitrack")
}

/// Reject anything but a bare filename (no separators, no `..`).
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(WikitrackError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': must be a plain filename"),
        });
    }
    Ok(())
}

/// State shared by every command for one process run.
///
/// Built once in `main` from the global flags and the config file, then
/// passed by reference into each command.
pub struct AppContext {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    api_url: String,
}

impl AppContext {
    /// Resolve the data directory and API endpoint and load `config.toml`.
    ///
    /// The endpoint comes from `--api-url` (or `WIKITRACK_API_URL`), then
    /// `[api] base_url`, then the public Wikidata API.
    pub fn load(api_url: Option<&str>, data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = data_dir.map(Path::to_path_buf).unwrap_or_else(default_data_dir);
        let config = AppConfig::load(&data_dir)?;
        let api_url = api_url
            .map(str::to_string)
            .unwrap_or_else(|| config.api.base_url.clone());
        tracing::debug!(data_dir = %data_dir.display(), %api_url, "context ready");
        Ok(Self {
            data_dir,
            config,
            api_url,
        })
    }

    pub fn client(&self) -> Result<WikidataClient> {
        WikidataClient::new(&self.api_url, &self.config.api)
    }

    /// Per-query result cap: the flag, else `[query] default_limit`.
    pub fn limit(&self, flag: Option<u64>) -> usize {
        flag.map(|n| n as usize)
            .unwrap_or(self.config.query.default_limit)
            .max(1)
    }

    pub fn history_store(&self) -> JsonHistoryStore {
        JsonHistoryStore::from_config(&self.data_dir, &self.config.history)
    }

    pub fn history(&self) -> Result<HistoryService<JsonHistoryStore>> {
        HistoryService::open(self.history_store(), self.config.history.max_entries)
    }

    /// Append a query to the history when history is enabled.
    ///
    /// A history failure is logged and never fails the query itself.
    pub fn record(&self, entry: NewTrackingEntry) {
        if !self.config.history.enabled {
            return;
        }
        let outcome = self.history().and_then(|mut history| {
            history.record(entry)?;
            Ok(())
        });
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "query not saved to history");
        }
    }
}

/// Single-threaded runtime for one command's network calls.
pub fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
