use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Level used when neither `--verbose` nor `--quiet` is given.
const DEFAULT_LEVEL: &str = "warn";

/// Map the global verbosity flags to a filter directive.
pub fn level_for(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => DEFAULT_LEVEL,
    }
}

/// Install the global `tracing` subscriber. Logs go to stderr so stdout
/// stays clean for tables and exports.
///
/// `RUST_LOG`, when set and valid, overrides the flag-derived level.
pub fn setup_logging(verbose: bool, quiet: bool, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
