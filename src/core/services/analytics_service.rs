use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::core::models::edit_record::{EditRecord, Property};

/// Bucket name for edits that carry no tags.
pub const NO_TAGS: &str = "No Tags";

/// Shape of one user's (or any) result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSummary {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub total_bytes_added: u64,
    pub total_bytes_removed: u64,
    pub property_counts: BTreeMap<Property, usize>,
}

pub fn summarize(edits: &[EditRecord]) -> EditSummary {
    let mut summary = EditSummary {
        total: edits.len(),
        ..EditSummary::default()
    };
    for edit in edits {
        let diff = edit.size.diff();
        if diff > 0 {
            summary.added += 1;
            summary.total_bytes_added += diff.unsigned_abs();
        } else if diff < 0 {
            summary.removed += 1;
            summary.total_bytes_removed += diff.unsigned_abs();
        } else {
            summary.unchanged += 1;
        }
        if let Some(property) = edit.property {
            *summary.property_counts.entry(property).or_insert(0) += 1;
        }
    }
    summary
}

/// One contributor to an entity's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorStats {
    pub user: String,
    pub edits: u64,
    pub bytes_added: u64,
    pub bytes_removed: u64,
    pub last_edit: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContributorSort {
    User,
    #[default]
    Edits,
    BytesAdded,
    BytesRemoved,
    LastEdit,
}

impl std::str::FromStr for ContributorSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "user" => Ok(ContributorSort::User),
            "edits" => Ok(ContributorSort::Edits),
            "bytesadded" | "added" => Ok(ContributorSort::BytesAdded),
            "bytesremoved" | "removed" => Ok(ContributorSort::BytesRemoved),
            "lastedit" | "last" => Ok(ContributorSort::LastEdit),
            other => Err(format!(
                "unknown contributor sort '{other}' (expected user, edits, bytes-added, bytes-removed or last-edit)"
            )),
        }
    }
}

/// Group an entity's revisions by editor. Order of first appearance is kept
/// before sorting.
pub fn contributor_stats(edits: &[EditRecord]) -> Vec<ContributorStats> {
    let mut order: Vec<String> = Vec::new();
    let mut by_user: HashMap<&str, ContributorStats> = HashMap::new();

    for edit in edits {
        let stats = by_user.entry(edit.user.as_str()).or_insert_with(|| {
            order.push(edit.user.clone());
            ContributorStats {
                user: edit.user.clone(),
                edits: 0,
                bytes_added: 0,
                bytes_removed: 0,
                last_edit: edit.timestamp,
            }
        });
        stats.edits += 1;
        let diff = edit.size.diff();
        if diff > 0 {
            stats.bytes_added += diff.unsigned_abs();
        } else if diff < 0 {
            stats.bytes_removed += diff.unsigned_abs();
        }
        if edit.timestamp > stats.last_edit {
            stats.last_edit = edit.timestamp;
        }
    }

    order
        .iter()
        .filter_map(|user| by_user.remove(user.as_str()))
        .collect()
}

/// Stable sort; `descending` flips the comparison.
pub fn sort_contributors(stats: &mut [ContributorStats], by: ContributorSort, descending: bool) {
    stats.sort_by(|a, b| {
        let ord = match by {
            ContributorSort::User => a.user.to_lowercase().cmp(&b.user.to_lowercase()),
            ContributorSort::Edits => a.edits.cmp(&b.edits),
            ContributorSort::BytesAdded => a.bytes_added.cmp(&b.bytes_added),
            ContributorSort::BytesRemoved => a.bytes_removed.cmp(&b.bytes_removed),
            ContributorSort::LastEdit => a.last_edit.cmp(&b.last_edit),
        };
        if descending { ord.reverse() } else { ord }
    });
}

/// Dashboard over a recent-changes sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    /// Edits per UTC calendar day, oldest day first.
    pub per_day: Vec<(NaiveDate, usize)>,
    /// Top contributors by edit count (at most `top_users`).
    pub top_contributors: Vec<(String, usize)>,
    /// Top tags (at most `top_tags`) plus a trailing "No Tags" bucket.
    pub tag_distribution: Vec<(String, usize)>,
    pub unique_users: usize,
    /// Mean absolute byte change, rounded to the nearest byte.
    pub average_change: u64,
    pub total: usize,
}

/// Descending by count, ties by name.
fn top_counts(counts: HashMap<&str, usize>, take: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(take);
    entries
}

pub fn activity_report(edits: &[EditRecord], top_users: usize, top_tags: usize) -> ActivityReport {
    if edits.is_empty() {
        return ActivityReport::default();
    }

    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut users: HashMap<&str, usize> = HashMap::new();
    let mut tags: HashMap<&str, usize> = HashMap::new();
    let mut untagged = 0usize;
    let mut abs_total: u64 = 0;

    for edit in edits {
        *per_day.entry(edit.timestamp.date_naive()).or_insert(0) += 1;
        *users.entry(edit.user.as_str()).or_insert(0) += 1;
        if edit.tags.is_empty() {
            untagged += 1;
        }
        for tag in &edit.tags {
            *tags.entry(tag.as_str()).or_insert(0) += 1;
        }
        abs_total += edit.size.diff().unsigned_abs();
    }

    let unique_users = users.len();
    let mut tag_distribution = top_counts(tags, top_tags);
    if untagged > 0 {
        tag_distribution.push((NO_TAGS.to_string(), untagged));
    }

    let n = edits.len() as u64;
    ActivityReport {
        per_day: per_day.into_iter().collect(),
        top_contributors: top_counts(users, top_users),
        tag_distribution,
        unique_users,
        average_change: (abs_total + n / 2) / n,
        total: edits.len(),
    }
}
