use crate::cli::commands::query_helpers::{exports_to_stdout, fetch, resolve_range, write_export};
use crate::cli::context::{AppContext, runtime};
use crate::cli::output;
use crate::cli::{ExportArgs, RangeArgs};
use crate::core::errors::Result;
use crate::core::services::analytics_service::{ActivityReport, activity_report};
use crate::core::traits::revision_source::RevisionSource;

const TOP_CONTRIBUTORS: usize = 10;
const TOP_TAGS: usize = 5;

/// Execute the `wikitrack analytics` command.
///
/// Charts a sample of recent changes: activity per day, top contributors
/// and tag distribution.
pub fn execute(ctx: &AppContext, range: &RangeArgs, limit: u64, export: &ExportArgs) -> Result<()> {
    let range = resolve_range(range)?;
    let client = ctx.client()?;
    let rt = runtime()?;

    let sample = fetch(
        &rt,
        "Sampling recent changes...",
        client.recent_changes(&range, ctx.limit(Some(limit))),
    )?;
    let report = activity_report(&sample, TOP_CONTRIBUTORS, TOP_TAGS);

    if exports_to_stdout(export) {
        return write_export(std::slice::from_ref(&report), export);
    }

    output::header(&format!("Analytics ({} → {})", range.from, range.to));
    if report.total == 0 {
        output::warning("No changes found in this range");
        return write_export(std::slice::from_ref(&report), export);
    }

    print_report(&report);
    write_export(std::slice::from_ref(&report), export)
}

fn print_chart(title: &str, rows: &[(String, usize)]) {
    output::header(title);
    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (label, n) in rows {
        output::chart_row(label, width, *n, max);
    }
}

fn print_report(report: &ActivityReport) {
    println!(
        "  {} change(s) by {} editor(s), average change {} bytes",
        report.total, report.unique_users, report.average_change
    );

    let per_day: Vec<(String, usize)> = report
        .per_day
        .iter()
        .map(|(day, n)| (day.to_string(), *n))
        .collect();
    print_chart("Activity per day", &per_day);
    print_chart("Top contributors", &report.top_contributors);
    print_chart("Tags", &report.tag_distribution);
}
