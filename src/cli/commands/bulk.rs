use std::path::{Path, PathBuf};

use crate::cli::commands::query_helpers::{exports_to_stdout, fetch, resolve_range, write_export};
use crate::cli::context::{AppContext, runtime};
use crate::cli::output;
use crate::cli::table::{self, Column};
use crate::cli::{ExportArgs, RangeArgs};
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::edit_record::Property;
use crate::core::models::tracking_entry::{NewTrackingEntry, QueryType};
use crate::core::models::user_stats::{BulkReport, Ranking, UserEditStats};
use crate::core::services::bulk_service::{
    BulkAggregator, BulkQuery, FailurePolicy, dedupe_usernames, parse_username_list,
};

/// Flags of the `bulk` command.
pub struct BulkOptions<'a> {
    pub usernames: &'a [String],
    pub file: Option<&'a Path>,
    pub range: &'a RangeArgs,
    pub properties: &'a [Property],
    pub limit: Option<u64>,
    pub strict: bool,
    pub top: usize,
    pub export: &'a ExportArgs,
}

/// Execute the `wikitrack bulk` command.
///
/// Queries every user concurrently, then prints per-user totals and the
/// cross-user rankings. Without `--strict`, users whose query failed are
/// listed separately and the rest of the report is still shown.
pub fn execute(ctx: &AppContext, opts: &BulkOptions<'_>) -> Result<()> {
    let mut names = opts.usernames.to_vec();
    if let Some(path) = opts.file {
        names.extend(read_username_file(path)?);
    }
    let names = dedupe_usernames(&names);
    if names.is_empty() {
        return Err(WikitrackError::NoUsernames);
    }

    let query = BulkQuery {
        range: resolve_range(opts.range)?,
        properties: opts.properties.to_vec(),
        limit: ctx.limit(opts.limit),
        policy: if opts.strict {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Partial
        },
    };

    let client = ctx.client()?;
    let rt = runtime()?;
    let aggregator = BulkAggregator { source: &client };
    let report = fetch(
        &rt,
        &format!("Querying {} user(s)...", names.len()),
        aggregator.aggregate(&names, &query),
    )?;

    ctx.record(NewTrackingEntry {
        query_type: QueryType::User,
        search_value: names.join(", "),
        date_range: query.range,
        properties: query.properties.clone(),
        results_count: report.total_edits() as usize,
    });

    if exports_to_stdout(opts.export) {
        return write_export(&report.user_stats, opts.export);
    }

    output::header(&format!(
        "Bulk: {} user(s) ({} → {})",
        names.len(),
        query.range.from,
        query.range.to
    ));
    print_report(&report, &query.properties, opts.top);
    write_export(&report.user_stats, opts.export)?;

    if report.user_stats.is_empty()
        && let Some(first) = report.failures.first()
    {
        return Err(WikitrackError::UserQueryFailed {
            username: first.username.clone(),
            reason: format!("every user query failed; first error: {}", first.reason),
        });
    }
    Ok(())
}

fn read_username_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(WikitrackError::FileNotFound {
            path: PathBuf::from(path),
        });
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_username_list(&text))
}

fn stats_columns(properties: &[Property]) -> Vec<Column<UserEditStats>> {
    let mut columns = vec![
        Column::field("User", "username"),
        Column::field("Edits", "totalEdits").right(),
        Column::compute("Added", |s: &UserEditStats| format!("+{}", s.total_bytes_added)).right(),
        Column::compute("Removed", |s: &UserEditStats| format!("-{}", s.total_bytes_removed))
            .right(),
    ];
    for &property in properties {
        columns.push(
            Column::compute(property.label(), move |s: &UserEditStats| {
                s.property_count(property).to_string()
            })
            .right(),
        );
    }
    columns
}

fn print_ranking(title: &str, ranking: &[Ranking], top: usize) {
    output::header(title);
    let shown = &ranking[..ranking.len().min(top)];
    if shown.iter().all(|r| r.value == 0) {
        output::detail("no activity");
        return;
    }
    let width = shown.iter().map(|r| r.username.chars().count()).max().unwrap_or(0);
    let max = shown.first().map(|r| r.value as usize).unwrap_or(0);
    for (i, r) in shown.iter().enumerate() {
        output::chart_row(
            &format!("{}. {}", i + 1, r.username),
            width + 3,
            r.value as usize,
            max,
        );
    }
}

fn print_report(report: &BulkReport, properties: &[Property], top: usize) {
    if !report.user_stats.is_empty() {
        println!();
        table::print(&stats_columns(properties), &report.user_stats);
        println!("\n  Total: {} edit(s)", report.total_edits());

        print_ranking("Top by edits", &report.top_users.by_edits, top);
        print_ranking("Top by bytes added", &report.top_users.by_bytes_added, top);
        for (property, ranking) in &report.top_users.by_property {
            print_ranking(&format!("Top by {}", property.label()), ranking, top);
        }
    }

    if !report.failures.is_empty() {
        output::header(&format!("Failed ({} user(s))", report.failures.len()));
        for failure in &report.failures {
            output::warning(&format!("{}: {}", failure.username, failure.reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn username_file_skips_comments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("users.txt");
        std::fs::write(&path, "# editors\nAlice\n\n  Bob  \n").unwrap();
        assert_eq!(read_username_file(&path).unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn missing_username_file_is_reported() {
        let err = read_username_file(Path::new("/nonexistent/users.txt")).unwrap_err();
        assert!(matches!(err, WikitrackError::FileNotFound { .. }));
    }

    #[test]
    fn one_column_per_selected_property() {
        let columns = stats_columns(&[Property::Labels, Property::Aliases]);
        assert_eq!(columns.len(), 6);
    }
}
