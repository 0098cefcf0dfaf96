use std::collections::{BTreeMap, HashSet};

use futures_util::future::join_all;

use crate::core::errors::{Result, WikitrackError};
use crate::core::models::date_range::DateRange;
use crate::core::models::edit_record::{EditRecord, Property};
use crate::core::models::user_stats::{BulkReport, Ranking, TopUsers, UserEditStats, UserFailure};
use crate::core::traits::revision_source::RevisionSource;

/// What to do when one user's query fails during a bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the users that succeeded and list the failures in the report.
    #[default]
    Partial,
    /// Fail the whole run on the first failed user (in input order).
    FailFast,
}

/// Parameters shared by every per-user query of a bulk run.
#[derive(Debug, Clone)]
pub struct BulkQuery {
    pub range: DateRange,
    pub properties: Vec<Property>,
    pub limit: usize,
    pub policy: FailurePolicy,
}

/// Fans single-user queries out over a `RevisionSource` and folds the results.
pub struct BulkAggregator<'a, S: RevisionSource> {
    pub source: &'a S,
}

impl<S: RevisionSource> BulkAggregator<'_, S> {
    /// Query every user concurrently, then build stats and rankings.
    ///
    /// Usernames are de-duplicated (first occurrence wins) before fan-out.
    pub async fn aggregate(&self, usernames: &[String], query: &BulkQuery) -> Result<BulkReport> {
        let users = dedupe_usernames(usernames);
        if users.is_empty() {
            return Err(WikitrackError::NoUsernames);
        }

        tracing::info!(users = users.len(), "starting bulk query");
        let fetches = users.iter().map(|user| {
            self.source
                .user_contributions(user, &query.range, &query.properties, query.limit)
        });
        let results = join_all(fetches).await;

        let outcomes: Vec<(String, Result<Vec<EditRecord>>)> =
            users.into_iter().zip(results).collect();
        build_report(outcomes, &query.properties, query.policy)
    }
}

/// Fold per-user query outcomes into a report.
///
/// The fold walks `outcomes` in order, so the report does not depend on
/// which request finished first.
pub fn build_report(
    outcomes: Vec<(String, Result<Vec<EditRecord>>)>,
    properties: &[Property],
    policy: FailurePolicy,
) -> Result<BulkReport> {
    let mut user_stats = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();

    for (username, outcome) in outcomes {
        match outcome {
            Ok(edits) => {
                let mut stats = UserEditStats::new(&username);
                for edit in &edits {
                    stats.add_edit(edit);
                }
                user_stats.push(stats);
            }
            Err(e) if policy == FailurePolicy::FailFast => {
                return Err(WikitrackError::UserQueryFailed {
                    username,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(user = %username, error = %e, "user query failed");
                failures.push(UserFailure {
                    username,
                    reason: e.to_string(),
                });
            }
        }
    }

    let top_users = rank_users(&user_stats, properties);
    Ok(BulkReport {
        user_stats,
        top_users,
        failures,
    })
}

/// Build the three rankings over `stats`.
pub fn rank_users(stats: &[UserEditStats], properties: &[Property]) -> TopUsers {
    let mut by_property = BTreeMap::new();
    for property in properties {
        by_property
            .entry(*property)
            .or_insert_with(|| rank_by(stats, |s| s.property_count(*property)));
    }

    TopUsers {
        by_edits: rank_by(stats, |s| s.total_edits),
        by_bytes_added: rank_by(stats, |s| s.total_bytes_added),
        by_property,
    }
}

/// Descending by `key`; equal keys fall back to username order.
fn rank_by(stats: &[UserEditStats], key: impl Fn(&UserEditStats) -> u64) -> Vec<Ranking> {
    let mut ranking: Vec<Ranking> = stats
        .iter()
        .map(|s| Ranking {
            username: s.username.clone(),
            value: key(s),
        })
        .collect();
    ranking.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.username.cmp(&b.username)));
    ranking
}

/// Drop repeated names, keeping the first occurrence's position.
pub fn dedupe_usernames(usernames: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    usernames
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .filter(|u| seen.insert(u.to_string()))
        .map(str::to_string)
        .collect()
}

/// Parse a username list: one per line, `#` comments and blank lines skipped.
pub fn parse_username_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::core::models::edit_record::SizeChange;
    use crate::core::models::entity::{EntityDetails, EntityId};
    use chrono::{NaiveDate, Utc};

    /// Source that serves canned contributions per user.
    struct FakeSource {
        edits: HashMap<String, Vec<EditRecord>>,
        failing: HashSet<String>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                edits: HashMap::new(),
                failing: HashSet::new(),
            }
        }

        fn with_user(mut self, name: &str, edits: Vec<EditRecord>) -> Self {
            self.edits.insert(name.to_string(), edits);
            self
        }

        fn failing(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }
    }

    impl RevisionSource for FakeSource {
        async fn user_contributions(
            &self,
            username: &str,
            _range: &DateRange,
            properties: &[Property],
            limit: usize,
        ) -> Result<Vec<EditRecord>> {
            if self.failing.contains(username) {
                return Err(WikitrackError::ApiRequest {
                    reason: "connection reset".into(),
                });
            }
            Ok(self
                .edits
                .get(username)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|e| {
                    properties.is_empty() || e.property.is_some_and(|p| properties.contains(&p))
                })
                .take(limit)
                .collect())
        }

        async fn entity_revisions(
            &self,
            _entity: &EntityId,
            _range: &DateRange,
            _limit: usize,
        ) -> Result<Vec<EditRecord>> {
            Ok(Vec::new())
        }

        async fn entity_details(&self, _entity: &EntityId) -> Result<Option<EntityDetails>> {
            Ok(None)
        }

        async fn recent_changes(&self, _range: &DateRange, _limit: usize) -> Result<Vec<EditRecord>> {
            Ok(Vec::new())
        }
    }

    fn edit(user: &str, comment: &str, diff: i64) -> EditRecord {
        EditRecord::new(
            1,
            "Q1",
            Utc::now(),
            user,
            comment,
            SizeChange::from_new_and_diff(500, diff),
            vec![],
        )
    }

    fn query(properties: Vec<Property>, policy: FailurePolicy) -> BulkQuery {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        BulkQuery {
            range: DateRange::new(day, day).unwrap(),
            properties,
            limit: 100,
            policy,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(source: &FakeSource, users: &[&str], q: &BulkQuery) -> Result<BulkReport> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(BulkAggregator { source }.aggregate(&names(users), q))
    }

    fn stats_of<'a>(report: &'a BulkReport, user: &str) -> &'a UserEditStats {
        report
            .user_stats
            .iter()
            .find(|s| s.username == user)
            .unwrap()
    }

    #[test]
    fn two_users_with_two_edits_each_total_four() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "label", 10), edit("A", "claim", -4)])
            .with_user("B", vec![edit("B", "label", 3), edit("B", "", 0)]);

        let report = run(&source, &["A", "B"], &query(vec![], FailurePolicy::Partial)).unwrap();

        assert_eq!(report.total_edits(), 4);
        assert_eq!(report.user_stats.len(), 2);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn user_with_more_edits_ranks_first() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "", 1)])
            .with_user("B", vec![edit("B", "", 1), edit("B", "", 1)]);

        let report = run(&source, &["A", "B"], &query(vec![], FailurePolicy::Partial)).unwrap();

        assert_eq!(report.top_users.by_edits[0].username, "B");
        assert_eq!(report.top_users.by_edits[0].value, 2);
        assert_eq!(report.top_users.by_edits[1].username, "A");
    }

    #[test]
    fn totals_equal_sum_of_fetched_edits() {
        let source = FakeSource::new()
            .with_user("A", (0..7).map(|_| edit("A", "", 2)).collect())
            .with_user("B", vec![])
            .with_user("C", (0..3).map(|_| edit("C", "", -2)).collect());

        let report =
            run(&source, &["A", "B", "C"], &query(vec![], FailurePolicy::Partial)).unwrap();

        let per_user: u64 = report.user_stats.iter().map(|s| s.total_edits).sum();
        assert_eq!(per_user, 10);
        assert_eq!(stats_of(&report, "B").total_edits, 0);
    }

    #[test]
    fn bytes_added_ranking_is_descending() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "", 50), edit("A", "", -70)])
            .with_user("B", vec![edit("B", "", 200)])
            .with_user("C", vec![edit("C", "", 10)]);

        let report =
            run(&source, &["A", "B", "C"], &query(vec![], FailurePolicy::Partial)).unwrap();

        let order: Vec<&str> = report
            .top_users
            .by_bytes_added
            .iter()
            .map(|r| r.username.as_str())
            .collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        let a = stats_of(&report, "A");
        assert_eq!(a.total_bytes_added, 50);
        assert_eq!(a.total_bytes_removed, 70);
    }

    #[test]
    fn property_rankings_cover_each_selected_property() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "label", 1), edit("A", "label", 1)])
            .with_user("B", vec![edit("B", "label", 1), edit("B", "sitelink", 1)]);

        let report = run(
            &source,
            &["A", "B"],
            &query(vec![Property::Labels, Property::Sitelinks], FailurePolicy::Partial),
        )
        .unwrap();

        let labels = &report.top_users.by_property[&Property::Labels];
        assert_eq!(labels[0].username, "A");
        assert_eq!(labels[0].value, 2);
        let sitelinks = &report.top_users.by_property[&Property::Sitelinks];
        assert_eq!(sitelinks[0].username, "B");
        assert_eq!(sitelinks[1].value, 0);
        assert_eq!(report.top_users.by_property.len(), 2);
    }

    #[test]
    fn partial_policy_reports_failures() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "", 1)])
            .failing("B");

        let report = run(&source, &["A", "B"], &query(vec![], FailurePolicy::Partial)).unwrap();

        assert_eq!(report.user_stats.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].username, "B");
        assert!(report.failures[0].reason.contains("connection reset"));
        assert!(report.top_users.by_edits.iter().all(|r| r.username != "B"));
    }

    #[test]
    fn fail_fast_policy_fails_whole_run() {
        let source = FakeSource::new()
            .with_user("A", vec![edit("A", "", 1)])
            .failing("B");

        let err = run(&source, &["A", "B"], &query(vec![], FailurePolicy::FailFast)).unwrap_err();
        assert!(matches!(err, WikitrackError::UserQueryFailed { ref username, .. } if username == "B"));
    }

    #[test]
    fn empty_user_list_is_an_error() {
        let source = FakeSource::new();
        let err = run(&source, &["", "  "], &query(vec![], FailurePolicy::Partial)).unwrap_err();
        assert!(matches!(err, WikitrackError::NoUsernames));
    }

    #[test]
    fn duplicates_are_queried_once() {
        let source = FakeSource::new().with_user("A", vec![edit("A", "", 1)]);
        let report = run(&source, &["A", "A", " A "], &query(vec![], FailurePolicy::Partial)).unwrap();
        assert_eq!(report.user_stats.len(), 1);
        assert_eq!(report.total_edits(), 1);
    }

    #[test]
    fn ties_fall_back_to_username_order() {
        let stats = vec![UserEditStats::new("zed"), UserEditStats::new("amy")];
        let top = rank_users(&stats, &[]);
        assert_eq!(top.by_edits[0].username, "amy");
    }

    #[test]
    fn username_list_skips_comments_and_blanks() {
        let text = "# editors\nAlice\n\n  Bob  \n#Carol\nDan\r\n";
        assert_eq!(parse_username_list(text), names(&["Alice", "Bob", "Dan"]));
    }
}
