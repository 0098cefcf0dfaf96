use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::tracking_entry::{NewTrackingEntry, TrackingEntry};
use crate::core::traits::history_store::HistoryStore;

/// In-memory query history backed by a `HistoryStore`.
///
/// Opening loads the stored list (or starts empty); every change is
/// flushed to the store before returning. Entries are kept newest first.
pub struct HistoryService<S: HistoryStore> {
    store: S,
    entries: Vec<TrackingEntry>,
    max_entries: usize,
}

impl<S: HistoryStore> HistoryService<S> {
    /// Load the stored history. `max_entries == 0` means unbounded.
    pub fn open(store: S, max_entries: usize) -> Result<Self> {
        let entries = store.load()?;
        tracing::debug!(entries = entries.len(), "history loaded");
        Ok(Self {
            store,
            entries,
            max_entries,
        })
    }

    /// Start from an empty history without reading the store, and flush it.
    ///
    /// Used to recover from a store that can no longer be loaded.
    pub fn reset(store: S, max_entries: usize) -> Result<Self> {
        store.save(&[])?;
        tracing::debug!("history reset");
        Ok(Self {
            store,
            entries: Vec::new(),
            max_entries,
        })
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[TrackingEntry] {
        &self.entries
    }

    /// Record a query stamped with the current time.
    pub fn record(&mut self, entry: NewTrackingEntry) -> Result<&TrackingEntry> {
        self.record_at(entry, Utc::now())
    }

    /// Record a query stamped with `now`.
    pub fn record_at(&mut self, entry: NewTrackingEntry, now: DateTime<Utc>) -> Result<&TrackingEntry> {
        let mut stamped = TrackingEntry::stamp(entry, now);

        // Ids are millisecond timestamps; keep them unique within one burst.
        if let Some(latest) = self.entries.first()
            && let (Ok(prev), Ok(next)) = (latest.id.parse::<i64>(), stamped.id.parse::<i64>())
            && next <= prev
        {
            stamped.id = (prev + 1).to_string();
        }

        self.entries.insert(0, stamped);
        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            self.entries.truncate(self.max_entries);
        }
        self.store.save(&self.entries)?;

        Ok(&self.entries[0])
    }

    /// Entries matching `term` (see `TrackingEntry::matches`).
    pub fn search(&self, term: &str) -> Vec<&TrackingEntry> {
        self.entries.iter().filter(|e| e.matches(term)).collect()
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        self.store.save(&self.entries)?;
        Ok(removed)
    }
}
