use crate::cli::commands::query_helpers::{
    exports_to_stdout, fetch, print_edit_page, print_summary, resolve_range, view_edits,
    write_export,
};
use crate::cli::context::{AppContext, runtime};
use crate::cli::output;
use crate::cli::{ExportArgs, RangeArgs, ViewArgs};
use crate::core::errors::Result;
use crate::core::models::edit_record::Property;
use crate::core::models::tracking_entry::{NewTrackingEntry, QueryType};
use crate::core::services::analytics_service::summarize;
use crate::core::traits::revision_source::RevisionSource;

/// Execute the `wikitrack user` command.
///
/// Fetches one user's contributions in the date range, records the query in
/// the history, then shows a summary and the filtered, sorted page of edits.
pub fn execute(
    ctx: &AppContext,
    username: &str,
    range: &RangeArgs,
    properties: &[Property],
    limit: Option<u64>,
    view: &ViewArgs,
    export: &ExportArgs,
) -> Result<()> {
    let range = resolve_range(range)?;
    let limit = ctx.limit(limit);
    let client = ctx.client()?;
    let rt = runtime()?;

    let edits = fetch(
        &rt,
        &format!("Fetching contributions of {username}..."),
        client.user_contributions(username, &range, properties, limit),
    )?;

    ctx.record(NewTrackingEntry {
        query_type: QueryType::User,
        search_value: username.to_string(),
        date_range: range,
        properties: properties.to_vec(),
        results_count: edits.len(),
    });

    let shown = view_edits(&edits, view);
    if exports_to_stdout(export) {
        return write_export(&shown, export);
    }

    output::header(&format!("User: {username} ({} → {})", range.from, range.to));
    if !properties.is_empty() {
        let names: Vec<&str> = properties.iter().map(|p| p.label()).collect();
        output::detail(&format!("Properties: {}", names.join(", ")));
    }

    if edits.is_empty() {
        output::warning("No edits found in this range");
        return write_export(&shown, export);
    }

    print_summary(&summarize(&shown));
    if shown.len() != edits.len() {
        output::detail(&format!("{} of {} edit(s) match the filter", shown.len(), edits.len()));
    }
    print_edit_page(&shown, view, false);
    write_export(&shown, export)
}
