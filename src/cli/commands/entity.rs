use futures_util::future::try_join;

use crate::cli::commands::query_helpers::{
    exports_to_stdout, fetch, print_edit_page, print_summary, resolve_range, view_edits,
    write_export,
};
use crate::cli::context::{AppContext, runtime};
use crate::cli::output;
use crate::cli::table::{self, Column};
use crate::cli::{ExportArgs, RangeArgs, ViewArgs};
use crate::core::errors::Result;
use crate::core::models::entity::{EntityDetails, EntityId};
use crate::core::models::tracking_entry::{NewTrackingEntry, QueryType};
use crate::core::services::analytics_service::{
    ContributorSort, ContributorStats, contributor_stats, sort_contributors, summarize,
};
use crate::core::traits::revision_source::RevisionSource;

const LANGUAGE: &str = "en";

/// How the contributor table is ordered.
pub struct ContributorOrder {
    pub by: ContributorSort,
    pub ascending: bool,
}

/// Execute the `wikitrack entity` command.
///
/// Loads the entity's metadata and its revisions in the date range in
/// parallel, then shows the details, a contributor table and the edits.
pub fn execute(
    ctx: &AppContext,
    raw_id: &str,
    range: &RangeArgs,
    limit: Option<u64>,
    order: &ContributorOrder,
    view: &ViewArgs,
    export: &ExportArgs,
) -> Result<()> {
    let id = EntityId::parse(raw_id)?;
    let range = resolve_range(range)?;
    let limit = ctx.limit(limit);
    let client = ctx.client()?;
    let rt = runtime()?;

    let (details, revisions) = fetch(
        &rt,
        &format!("Fetching {id}..."),
        try_join(
            client.entity_details(&id),
            client.entity_revisions(&id, &range, limit),
        ),
    )?;

    ctx.record(NewTrackingEntry {
        query_type: QueryType::Entity,
        search_value: id.to_string(),
        date_range: range,
        properties: Vec::new(),
        results_count: revisions.len(),
    });

    let shown = view_edits(&revisions, view);
    if exports_to_stdout(export) {
        return write_export(&shown, export);
    }

    print_details(&id, details.as_ref());
    output::detail(&format!("Range: {} → {}", range.from, range.to));

    if revisions.is_empty() {
        output::warning("No revisions found in this range");
        return write_export(&shown, export);
    }

    print_summary(&summarize(&shown));

    let mut contributors = contributor_stats(&revisions);
    sort_contributors(&mut contributors, order.by, !order.ascending);
    output::header(&format!("Contributors ({})", contributors.len()));
    table::print(&contributor_columns(), &contributors);

    output::header("Revisions");
    print_edit_page(&shown, view, true);
    write_export(&shown, export)
}

fn print_details(id: &EntityId, details: Option<&EntityDetails>) {
    let Some(details) = details else {
        output::header(&format!("Entity: {id}"));
        output::warning(&format!("{id} does not exist or has been deleted"));
        return;
    };

    match details.label(LANGUAGE) {
        Some(label) => output::header(&format!("Entity: {id} ({label})")),
        None => output::header(&format!("Entity: {id}")),
    }
    if let Some(description) = details.description(LANGUAGE) {
        println!("  {description}");
    }
    output::detail(&format!(
        "{} statement(s) across {} propert(ies)",
        details.statement_count(),
        details.claims.len()
    ));
}

fn contributor_columns() -> Vec<Column<ContributorStats>> {
    vec![
        Column::field("User", "user").max_width(32),
        Column::field("Edits", "edits").right(),
        Column::compute("Added", |c: &ContributorStats| format!("+{}", c.bytes_added)).right(),
        Column::compute("Removed", |c: &ContributorStats| format!("-{}", c.bytes_removed)).right(),
        Column::compute("Last edit", |c: &ContributorStats| {
            c.last_edit.format("%Y-%m-%d %H:%M").to_string()
        }),
    ]
}
