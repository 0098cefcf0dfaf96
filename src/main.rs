mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::commands::bulk::BulkOptions;
use cli::commands::entity::ContributorOrder;
use cli::context::AppContext;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    if args.no_color {
        colored::control::set_override(false);
    }
    cli::logging::setup_logging(args.verbose, args.quiet, !args.no_color);

    let result = AppContext::load(args.api_url.as_deref(), args.data_dir.as_deref())
        .and_then(|ctx| run(&ctx, &args.command));

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(ctx: &AppContext, command: &Commands) -> crate::core::errors::Result<()> {
    match command {
        Commands::User {
            username,
            range,
            properties,
            limit,
            view,
            export,
        } => cli::commands::user::execute(ctx, username, range, properties, *limit, view, export),
        Commands::Bulk {
            usernames,
            file,
            range,
            properties,
            limit,
            strict,
            top,
            export,
        } => cli::commands::bulk::execute(
            ctx,
            &BulkOptions {
                usernames,
                file: file.as_deref(),
                range,
                properties,
                limit: *limit,
                strict: *strict,
                top: *top,
                export,
            },
        ),
        Commands::Entity {
            id,
            range,
            limit,
            sort_contributors,
            ascending,
            view,
            export,
        } => cli::commands::entity::execute(
            ctx,
            id,
            range,
            *limit,
            &ContributorOrder {
                by: *sort_contributors,
                ascending: *ascending,
            },
            view,
            export,
        ),
        Commands::Recent {
            range,
            limit,
            view,
            export,
        } => cli::commands::recent::execute(ctx, range, *limit, view, export),
        Commands::Analytics {
            range,
            limit,
            export,
        } => cli::commands::analytics::execute(ctx, range, *limit, export),
        Commands::History { action } => cli::commands::history::execute(ctx, action),
    }
}
