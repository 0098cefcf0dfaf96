use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::app_config::HistorySection;
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::tracking_entry::TrackingEntry;
use crate::core::traits::history_store::HistoryStore;

/// History store that keeps the whole list as one JSON array in a file.
///
/// Every save rewrites the file through a temporary sibling that is renamed
/// into place, so a crash mid-write leaves the previous list intact.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    /// Create a store that reads and writes `{data_dir}/{file_name}`.
    pub fn new(data_dir: &Path, file_name: &str) -> Self {
        Self {
            path: data_dir.join(file_name),
        }
    }

    /// Create a store from the `[history]` section.
    pub fn from_config(data_dir: &Path, section: &HistorySection) -> Self {
        Self::new(data_dir, &section.file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<TrackingEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| WikitrackError::HistoryError {
            detail: format!("Cannot read history at {}: {e}", self.path.display()),
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| WikitrackError::HistoryError {
            detail: format!("History file {} is corrupt: {e}", self.path.display()),
        })
    }

    fn save(&self, entries: &[TrackingEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| {
            WikitrackError::HistoryError {
                detail: format!("Failed to serialize history: {e}"),
            }
        })?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| WikitrackError::HistoryError {
            detail: format!("Cannot create temp file in {}: {e}", dir.display()),
        })?;
        writeln!(tmp, "{json}").map_err(|e| WikitrackError::HistoryError {
            detail: format!("Failed to write history: {e}"),
        })?;
        tmp.persist(&self.path).map_err(|e| WikitrackError::HistoryError {
            detail: format!("Cannot replace {}: {e}", self.path.display()),
        })?;

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::date_range::DateRange;
    use crate::core::models::tracking_entry::{NewTrackingEntry, QueryType};
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_entry(value: &str) -> TrackingEntry {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        TrackingEntry::stamp(
            NewTrackingEntry {
                query_type: QueryType::User,
                search_value: value.to_string(),
                date_range: DateRange::new(day, day).unwrap(),
                properties: vec![],
                results_count: 3,
            },
            Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(tmp.path(), "history.json");

        let entries = vec![sample_entry("Alice"), sample_entry("Bob")];
        store.save(&entries).unwrap();

        assert_eq!(store.load().unwrap(), entries);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let store = JsonHistoryStore::new(Path::new("/nonexistent"), "history.json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_empty_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("history.json"), "").unwrap();
        let store = JsonHistoryStore::new(tmp.path(), "history.json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_history_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("history.json"), "{not json").unwrap();
        let store = JsonHistoryStore::new(tmp.path(), "history.json");

        let err = store.load().unwrap_err();
        assert!(matches!(err, WikitrackError::HistoryError { .. }));
    }

    #[test]
    fn save_creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(&tmp.path().join("nested/dir"), "history.json");

        store.save(&[sample_entry("Alice")]).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_overwrites_previous_list() {
        let tmp = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(tmp.path(), "history.json");

        store.save(&[sample_entry("Alice"), sample_entry("Bob")]).unwrap();
        store.save(&[]).unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn stored_json_uses_camel_case_keys() {
        let tmp = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(tmp.path(), "history.json");
        store.save(&[sample_entry("Alice")]).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"searchValue\": \"Alice\""));
        assert!(content.contains("\"ipAddress\": \"127.0.0.1\""));
        assert!(content.contains("\"queryType\": \"user\""));
    }
}
