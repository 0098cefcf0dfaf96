use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::date_range::DateRange;
use crate::core::models::edit_record::Property;

/// Address recorded for every query; queries always originate locally.
pub const LOCAL_ADDRESS: &str = "127.0.0.1";

/// Which tracker produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    User,
    Entity,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::User => "user",
            QueryType::Entity => "entity",
        }
    }
}

/// What a command knows about a search before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrackingEntry {
    pub query_type: QueryType,
    pub search_value: String,
    pub date_range: DateRange,
    pub properties: Vec<Property>,
    pub results_count: usize,
}

/// A single past query in the history store. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub query_type: QueryType,
    pub search_value: String,
    pub date_range: DateRange,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub results_count: usize,
}

impl TrackingEntry {
    /// Stamp a new entry with its id, creation time and origin address.
    pub fn stamp(entry: NewTrackingEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            timestamp: now,
            ip_address: LOCAL_ADDRESS.to_string(),
            query_type: entry.query_type,
            search_value: entry.search_value,
            date_range: entry.date_range,
            properties: entry.properties,
            results_count: entry.results_count,
        }
    }

    /// Case-insensitive match on search value and query type; substring on address.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.search_value.to_lowercase().contains(&needle)
            || self.query_type.as_str().contains(&needle)
            || self.ip_address.contains(term)
    }
}
