use crate::cli::commands::query_helpers::{
    exports_to_stdout, fetch, print_edit_page, print_summary, resolve_range, view_edits,
    write_export,
};
use crate::cli::context::{AppContext, runtime};
use crate::cli::output;
use crate::cli::{ExportArgs, RangeArgs, ViewArgs};
use crate::core::errors::Result;
use crate::core::services::analytics_service::summarize;
use crate::core::traits::revision_source::RevisionSource;

/// Execute the `wikitrack recent` command.
///
/// Browses the global recent-changes feed. Filters apply to the fetched
/// sample only; they are not sent to the API.
pub fn execute(
    ctx: &AppContext,
    range: &RangeArgs,
    limit: Option<u64>,
    view: &ViewArgs,
    export: &ExportArgs,
) -> Result<()> {
    let range = resolve_range(range)?;
    let limit = ctx.limit(limit);
    let client = ctx.client()?;
    let rt = runtime()?;

    let changes = fetch(
        &rt,
        "Fetching recent changes...",
        client.recent_changes(&range, limit),
    )?;

    let shown = view_edits(&changes, view);
    if exports_to_stdout(export) {
        return write_export(&shown, export);
    }

    output::header(&format!("Recent changes ({} → {})", range.from, range.to));
    if changes.is_empty() {
        output::warning("No changes found in this range");
        return write_export(&shown, export);
    }

    print_summary(&summarize(&shown));
    if shown.len() != changes.len() {
        output::detail(&format!(
            "{} of {} change(s) match the filter",
            shown.len(),
            changes.len()
        ));
    }
    print_edit_page(&shown, view, true);
    write_export(&shown, export)
}
