use crate::core::errors::Result;
use crate::core::models::tracking_entry::TrackingEntry;

/// Port for persisting the query history as a whole list.
pub trait HistoryStore: Send + Sync {
    /// Read the stored list, or an empty list if nothing was stored yet.
    fn load(&self) -> Result<Vec<TrackingEntry>>;

    /// Replace the stored list.
    fn save(&self, entries: &[TrackingEntry]) -> Result<()>;
}
