use std::path::PathBuf;

/// All domain errors for wikitrack.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum WikitrackError {
    #[error(
        "API request failed: {reason}\n\n  \
         Check your network connection and that the API URL is reachable.\n  \
         Override the endpoint with --api-url or WIKITRACK_API_URL."
    )]
    ApiRequest { reason: String },

    #[error("Unexpected API response: {reason}")]
    ApiResponse { reason: String },

    #[error("Query for user '{username}' failed: {reason}")]
    UserQueryFailed { username: String, reason: String },

    #[error(
        "Invalid date: '{value}'\n\n  \
         Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
    )]
    InvalidDate { value: String },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: String, to: String },

    #[error(
        "Invalid entity id: '{value}'\n\n  \
         Expected an item (Q42), property (P31) or lexeme (L7) identifier."
    )]
    InvalidEntityId { value: String },

    #[error(
        "No usernames to track\n\n  \
         Pass usernames as arguments or with --file <path>.\n  \
         In files, use one username per line; lines starting with # are ignored."
    )]
    NoUsernames,

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "History error: {detail}\n\n  \
         Run 'wikitrack history clear' to reset the stored history."
    )]
    HistoryError { detail: String },

    #[error("Export failed: {reason}")]
    ExportError { reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WikitrackError>;
