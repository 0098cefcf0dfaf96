use std::future::Future;

use chrono::Utc;
use colored::Color;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::cli::output;
use crate::cli::table::{self, Column};
use crate::cli::{ExportArgs, RangeArgs, ViewArgs};
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::date_range::DateRange;
use crate::core::models::edit_record::EditRecord;
use crate::core::services::analytics_service::EditSummary;
use crate::core::services::export_service;
use crate::core::services::filter_service::{apply_filter, paginate, sort_edits};

/// Resolve `--from`/`--to` against the current month.
pub fn resolve_range(args: &RangeArgs) -> Result<DateRange> {
    DateRange::resolve(
        args.from.as_deref(),
        args.to.as_deref(),
        Utc::now().date_naive(),
    )
}

/// Drive one API call to completion behind a spinner.
pub fn fetch<T>(rt: &Runtime, msg: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let sp = output::spinner(msg);
    let result = rt.block_on(fut);
    output::abandon_spinner(sp);
    result
}

/// True when the export replaces terminal output (format set, no `--output`).
pub fn exports_to_stdout(export: &ExportArgs) -> bool {
    export.format.is_some() && export.output.is_none()
}

/// Write `records` per `--format`/`--output`. Does nothing without `--format`.
pub fn write_export<T: Serialize>(records: &[T], export: &ExportArgs) -> Result<()> {
    let Some(format) = export.format else {
        return Ok(());
    };
    let body = export_service::export(records, format)?;

    match &export.output {
        Some(path) => {
            std::fs::write(path, body).map_err(|e| WikitrackError::ExportError {
                reason: format!("Cannot write {}: {e}", path.display()),
            })?;
            tracing::info!(path = %path.display(), %format, records = records.len(), "export written");
            output::success(&format!(
                "Exported {} record(s) as {format} to {}",
                records.len(),
                path.display()
            ));
        }
        None => println!("{body}"),
    }
    Ok(())
}

/// Apply the `--filter-*` and `--sort`/`--order` flags to a fetched set.
pub fn view_edits(edits: &[EditRecord], view: &ViewArgs) -> Vec<EditRecord> {
    let mut kept = apply_filter(edits, &view.filter());
    sort_edits(&mut kept, view.sort, view.order);
    kept
}

fn size_color(edit: &EditRecord) -> Option<Color> {
    match edit.size.diff().signum() {
        1 => Some(Color::Green),
        -1 => Some(Color::Red),
        _ => None,
    }
}

/// Columns of an edit table. `with_user` adds the editor column.
pub fn edit_columns(with_user: bool) -> Vec<Column<EditRecord>> {
    let mut columns = vec![
        Column::compute("Time", |e: &EditRecord| {
            e.timestamp.format("%Y-%m-%d %H:%M").to_string()
        }),
        Column::field("Title", "title"),
    ];
    if with_user {
        columns.push(Column::field("User", "user").max_width(24));
    }
    columns.push(Column::compute("Property", |e: &EditRecord| {
        e.property.map(|p| p.label()).unwrap_or("-").to_string()
    }));
    columns.push(
        Column::compute("Bytes", |e: &EditRecord| {
            format!("{} → {}", e.size.old(), e.size.new_size())
        })
        .right(),
    );
    columns.push(
        Column::compute("Change", |e: &EditRecord| format!("{:+}", e.size.diff()))
            .right()
            .tint(size_color),
    );
    columns.push(Column::field("Tags", "tags").max_width(24));
    columns.push(Column::field("Comment", "comment").max_width(60));
    columns
}

/// Print one page of an edit table with its page footer.
pub fn print_edit_page(edits: &[EditRecord], view: &ViewArgs, with_user: bool) {
    let page = paginate(edits, view.page, view.per_page);
    if page.total == 0 {
        output::warning("No edits match the filter");
        return;
    }
    if page.items.is_empty() {
        output::warning(&format!(
            "Page {} is empty ({} page(s) available)",
            page.page, page.pages
        ));
        return;
    }
    println!();
    table::print(&edit_columns(with_user), page.items);
    println!(
        "\n  Page {} of {} ({} edit(s))",
        page.page, page.pages, page.total
    );
}

pub fn print_summary(summary: &EditSummary) {
    println!(
        "  {} edit(s): {} added, {} removed, {} unchanged",
        summary.total, summary.added, summary.removed, summary.unchanged
    );
    println!(
        "  Bytes: {} / {}",
        output::signed_bytes(summary.total_bytes_added as i64),
        output::signed_bytes(-(summary.total_bytes_removed as i64))
    );
    if !summary.property_counts.is_empty() {
        let parts: Vec<String> = summary
            .property_counts
            .iter()
            .map(|(p, n)| format!("{} {n}", p.label()))
            .collect();
        println!("  Properties: {}", parts.join(", "));
    }
}
