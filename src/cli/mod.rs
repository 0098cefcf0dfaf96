pub mod commands;
pub mod context;
pub mod logging;
pub mod output;
pub mod table;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::models::edit_record::Property;
use crate::core::services::analytics_service::ContributorSort;
use crate::core::services::export_service::ExportFormat;
use crate::core::services::filter_service::{EditFilter, SortDirection, SortField};

/// Track Wikidata edit activity: users, entities, recent changes.
#[derive(Parser, Debug)]
#[command(name = "wikitrack", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Revision API endpoint
    #[arg(long, global = true, env = "WIKITRACK_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding config.toml and the query history
    #[arg(long, global = true, env = "WIKITRACK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one user's contributions
    User {
        /// Username to track
        username: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Only keep edits to these properties (comma separated or repeated)
        #[arg(long = "property", value_delimiter = ',')]
        properties: Vec<Property>,
        /// Maximum number of edits to fetch
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=5000))]
        limit: Option<u64>,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Aggregate and rank many users at once
    Bulk {
        /// Usernames to track
        usernames: Vec<String>,
        /// Read usernames from a file (one per line, # for comments)
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        range: RangeArgs,
        /// Properties to count and rank (comma separated or repeated)
        #[arg(long = "property", value_delimiter = ',')]
        properties: Vec<Property>,
        /// Maximum number of edits to fetch per user
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=5000))]
        limit: Option<u64>,
        /// Fail the whole run if any user's query fails
        #[arg(long)]
        strict: bool,
        /// Number of users shown in each ranking
        #[arg(long, default_value_t = 5)]
        top: usize,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show an entity's details, revision history and contributors
    Entity {
        /// Entity id (Q42, P31, L7)
        id: String,
        #[command(flatten)]
        range: RangeArgs,
        /// Maximum number of revisions to fetch
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=5000))]
        limit: Option<u64>,
        /// Contributor table order: user, edits, bytes-added, bytes-removed, last-edit
        #[arg(long, default_value = "edits")]
        sort_contributors: ContributorSort,
        /// Sort contributors ascending instead of descending
        #[arg(long)]
        ascending: bool,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Browse and filter recent changes across the wiki
    Recent {
        #[command(flatten)]
        range: RangeArgs,
        /// Maximum number of changes to fetch
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=5000))]
        limit: Option<u64>,
        #[command(flatten)]
        view: ViewArgs,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Charts over a sample of recent changes
    Analytics {
        #[command(flatten)]
        range: RangeArgs,
        /// Size of the recent-changes sample
        #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..=5000))]
        limit: u64,
        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show or clear the query history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List past queries, newest first
    List {
        /// Only entries whose value, type or address contains this text
        #[arg(long)]
        search: Option<String>,
        /// Show the N most recent entries
        #[arg(long)]
        last: Option<usize>,
    },
    /// Delete every history entry
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Inclusive date range; defaults to the current month.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

/// Client-side filter, sort and paging of a fetched result set.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Keep edits whose user contains this text
    #[arg(long, conflicts_with_all = ["filter_tag", "min_bytes"])]
    pub filter_user: Option<String>,
    /// Keep edits with a tag containing this text
    #[arg(long, conflicts_with = "min_bytes")]
    pub filter_tag: Option<String>,
    /// Keep edits changing at least this many bytes (either way)
    #[arg(long)]
    pub min_bytes: Option<String>,
    /// Sort field: timestamp, size, property, user, title
    #[arg(long, default_value = "timestamp")]
    pub sort: SortField,
    /// Sort order: asc or desc
    #[arg(long, default_value = "desc")]
    pub order: SortDirection,
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (0 shows everything)
    #[arg(long, default_value_t = 25)]
    pub per_page: usize,
}

impl ViewArgs {
    pub fn filter(&self) -> EditFilter {
        if let Some(user) = &self.filter_user {
            EditFilter::User(user.clone())
        } else if let Some(tag) = &self.filter_tag {
            EditFilter::Tag(tag.clone())
        } else if let Some(raw) = &self.min_bytes {
            EditFilter::MinBytes(raw.clone())
        } else {
            EditFilter::All
        }
    }
}

/// Write the result set to a file or stdout instead of (or as well as) tables.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Export format: json, csv or pdf
    #[arg(long)]
    pub format: Option<ExportFormat>,
    /// File to write the export to (stdout when omitted)
    #[arg(long, requires = "format")]
    pub output: Option<PathBuf>,
}
