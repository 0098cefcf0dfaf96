use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::models::edit_record::{EditRecord, SizeChange};
use crate::core::models::entity::{EntityDetails, EntityId, LocalizedText};

/// Top-level shape shared by every `action=query` / `wbgetentities` response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<Q> {
    pub error: Option<ApiErrorBody>,
    /// Parameters to send back to fetch the next page of a list.
    #[serde(rename = "continue")]
    pub continuation: Option<BTreeMap<String, serde_json::Value>>,
    pub query: Option<Q>,
}

/// MediaWiki error object (`{"error": {"code": ..., "info": ...}}`).
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// Flatten a `continue` object into request parameters.
pub fn continuation_params(raw: &BTreeMap<String, serde_json::Value>) -> Vec<(String, String)> {
    raw.iter()
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

// ─── list=usercontribs ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserContribsQuery {
    #[serde(default)]
    pub usercontribs: Vec<RawContribution>,
}

#[derive(Debug, Deserialize)]
pub struct RawContribution {
    pub revid: u64,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub sizediff: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RawContribution {
    /// Contributions do not carry the user; the queried name is used.
    pub fn normalize(self, username: &str) -> EditRecord {
        EditRecord::new(
            self.revid,
            self.title,
            self.timestamp,
            username,
            self.comment,
            SizeChange::from_new_and_diff(self.size, self.sizediff),
            self.tags,
        )
    }
}

// ─── prop=revisions ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RevisionsQuery {
    #[serde(default)]
    pub pages: BTreeMap<String, RawPage>,
}

impl RevisionsQuery {
    /// Revisions of the single page that was asked for.
    pub fn into_revisions(self) -> Vec<RawRevision> {
        self.pages
            .into_values()
            .next()
            .map(|page| page.revisions)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub revisions: Vec<RawRevision>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRevision {
    pub revid: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub size: i64,
    pub sizediff: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Normalize a newest-first run of revisions of `title`.
///
/// When the API omits `sizediff`, the delta is taken against the next-older
/// revision in the run; the oldest one falls back to no change.
pub fn normalize_revisions(title: &str, revisions: Vec<RawRevision>) -> Vec<EditRecord> {
    let older_sizes: Vec<Option<i64>> = revisions
        .iter()
        .skip(1)
        .map(|r| Some(r.size))
        .chain(std::iter::once(None))
        .collect();

    revisions
        .into_iter()
        .zip(older_sizes)
        .map(|(rev, older)| {
            let diff = rev
                .sizediff
                .or_else(|| older.map(|o| rev.size - o))
                .unwrap_or(0);
            EditRecord::new(
                rev.revid,
                title,
                rev.timestamp,
                rev.user,
                rev.comment,
                SizeChange::from_new_and_diff(rev.size, diff),
                rev.tags,
            )
        })
        .collect()
}

// ─── list=recentchanges ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecentChangesQuery {
    #[serde(default)]
    pub recentchanges: Vec<RawRecentChange>,
}

#[derive(Debug, Deserialize)]
pub struct RawRecentChange {
    #[serde(default)]
    pub revid: u64,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub oldlen: i64,
    #[serde(default)]
    pub newlen: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RawRecentChange {
    pub fn normalize(self) -> EditRecord {
        EditRecord::new(
            self.revid,
            self.title,
            self.timestamp,
            self.user,
            self.comment,
            SizeChange::from_sizes(self.oldlen, self.newlen),
            self.tags,
        )
    }
}

// ─── action=wbgetentities ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EntitiesResponse {
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub entities: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Deserialize)]
pub struct RawEntity {
    /// Present (as an empty string) when the entity does not exist.
    pub missing: Option<serde_json::Value>,
    #[serde(default)]
    pub labels: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    pub claims: BTreeMap<String, Vec<serde_json::Value>>,
}

impl RawEntity {
    pub fn into_details(self, id: EntityId) -> Option<EntityDetails> {
        if self.missing.is_some() {
            return None;
        }
        Some(EntityDetails {
            id,
            labels: self.labels,
            descriptions: self.descriptions,
            claims: self.claims,
        })
    }
}
