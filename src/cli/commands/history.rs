use std::io::{self, BufRead, Write};

use crate::cli::HistoryAction;
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::cli::table::{self, Column};
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::tracking_entry::TrackingEntry;
use crate::core::services::history_service::HistoryService;

/// Execute the `wikitrack history` command.
pub fn execute(ctx: &AppContext, action: &HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List { search, last } => list(ctx, search.as_deref(), *last),
        HistoryAction::Clear { yes } => clear(ctx, *yes),
    }
}

fn list(ctx: &AppContext, search: Option<&str>, last: Option<usize>) -> Result<()> {
    let history = ctx.history()?;

    let mut entries: Vec<&TrackingEntry> = match search {
        Some(term) => history.search(term),
        None => history.entries().iter().collect(),
    };
    if let Some(n) = last {
        entries.truncate(n);
    }

    if entries.is_empty() {
        output::header("wikitrack history");
        output::warning("No history entries found");
        if search.is_some() {
            println!("  Try removing --search to see all entries.");
        }
        if !ctx.config.history.enabled {
            println!("  History recording is disabled in config.toml.");
        }
        return Ok(());
    }

    output::header(&format!("wikitrack history ({} entries)", entries.len()));
    println!();
    let rows: Vec<TrackingEntry> = entries.into_iter().cloned().collect();
    table::print(&history_columns(), &rows);
    output::detail(&format!("Stored in {}", ctx.history_store().path().display()));
    Ok(())
}

fn history_columns() -> Vec<Column<TrackingEntry>> {
    vec![
        Column::compute("When", |e: &TrackingEntry| {
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
        }),
        Column::field("Type", "queryType"),
        Column::field("Search", "searchValue").max_width(40),
        Column::compute("Range", |e: &TrackingEntry| {
            format!("{} → {}", e.date_range.from, e.date_range.to)
        }),
        Column::field("Properties", "properties").max_width(30),
        Column::field("Results", "resultsCount").right(),
        Column::field("Address", "ipAddress"),
    ]
}

fn clear(ctx: &AppContext, yes: bool) -> Result<()> {
    let mut history = match ctx.history() {
        Ok(history) => history,
        Err(WikitrackError::HistoryError { detail }) => return reset_unreadable(ctx, &detail, yes),
        Err(e) => return Err(e),
    };
    if history.entries().is_empty() {
        output::warning("History is already empty");
        return Ok(());
    }

    let question = format!("Delete all {} history entries?", history.entries().len());
    if !yes && !confirm(&question)? {
        output::warning("Aborted, history kept.");
        return Ok(());
    }

    let removed = history.clear()?;
    output::success(&format!("Removed {removed} history entries"));
    Ok(())
}

/// The stored list cannot be loaded; overwrite it with an empty one.
fn reset_unreadable(ctx: &AppContext, detail: &str, yes: bool) -> Result<()> {
    output::warning(&format!("Stored history is unreadable: {detail}"));
    if !yes && !confirm("Replace it with an empty history?")? {
        output::warning("Aborted, history file left untouched.");
        return Ok(());
    }

    let store = ctx.history_store();
    let path = store.path().to_path_buf();
    HistoryService::reset(store, ctx.config.history.max_entries)?;
    output::success(&format!("Reset history at {}", path.display()));
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("  {question} [y/N]: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
