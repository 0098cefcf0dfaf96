use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::models::edit_record::{EditRecord, Property};

/// Per-user totals derived from one query's edits. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEditStats {
    pub username: String,
    pub total_edits: u64,
    pub property_stats: BTreeMap<Property, u64>,
    pub total_bytes_added: u64,
    pub total_bytes_removed: u64,
}

impl UserEditStats {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Fold a single edit into the running totals.
    pub fn add_edit(&mut self, edit: &EditRecord) {
        self.total_edits += 1;
        if let Some(property) = edit.property {
            *self.property_stats.entry(property).or_insert(0) += 1;
        }
        let diff = edit.size.diff();
        if diff > 0 {
            self.total_bytes_added += diff.unsigned_abs();
        } else {
            self.total_bytes_removed += diff.unsigned_abs();
        }
    }

    pub fn property_count(&self, property: Property) -> u64 {
        self.property_stats.get(&property).copied().unwrap_or(0)
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub username: String,
    pub value: u64,
}

/// Cross-user rankings, each sorted descending by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUsers {
    pub by_edits: Vec<Ranking>,
    pub by_bytes_added: Vec<Ranking>,
    pub by_property: BTreeMap<Property, Vec<Ranking>>,
}

/// A user whose query failed during a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFailure {
    pub username: String,
    pub reason: String,
}

/// Result of a bulk aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    /// Stats for every successfully queried user, in input order.
    pub user_stats: Vec<UserEditStats>,
    pub top_users: TopUsers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UserFailure>,
}

impl BulkReport {
    pub fn total_edits(&self) -> u64 {
        self.user_stats.iter().map(|s| s.total_edits).sum()
    }
}
