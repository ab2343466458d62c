//! Sprig CLI - stacked branches that stay on top of their parents.

use clap::Parser;
use tracing::Level;

mod commands;
mod output;
mod prompt;
mod services;
mod spinner;

use commands::navigate::Direction;
use commands::{Cli, Commands};
use services::{ModifyOptions, Staging, SyncOptions};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    output::set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Init { trunk } => commands::init::run(trunk.as_deref()),
        Commands::Track { branch, parent } => {
            commands::track::run(branch.as_deref(), parent.as_deref())
        }
        Commands::Untrack { branch, force } => commands::untrack::run(branch.as_deref(), force),
        Commands::Create { name, message, all } => {
            commands::create::run(&commands::create::CreateOptions {
                name: &name,
                message: message.as_deref(),
                all,
            })
        }
        Commands::Modify {
            new_commit,
            all,
            patch,
            message,
        } => commands::modify::run(&ModifyOptions {
            new_commit,
            staging: Staging::from_flags(all, patch),
            message,
        }),
        Commands::Commit {
            message,
            all,
            patch,
        } => commands::commit::run(message.as_deref(), Staging::from_flags(all, patch)),
        Commands::Restack { only } => commands::restack::run(only),
        Commands::Continue => commands::continue_::run(),
        Commands::Move {
            target,
            onto,
            source,
        } => commands::move_branch::run(&commands::move_branch::MoveOptions {
            target: target.as_deref().or(onto.as_deref()),
            source: source.as_deref(),
        }),
        Commands::Fold { keep, force } => {
            commands::fold::run(&commands::fold::FoldOptions { keep, force })
        }
        Commands::Split {
            by_commit,
            by_hunk,
            by_file,
            name,
        } => commands::split::run(&commands::split::SplitOptions {
            by_commit,
            by_hunk,
            by_file,
            name,
        }),
        Commands::Delete { branch, force } => commands::delete::run(branch.as_deref(), force),
        Commands::Rename { new_name, branch } => {
            commands::rename::run(new_name.as_deref(), branch.as_deref())
        }
        Commands::Sync { force, no_restack } => commands::sync::run(SyncOptions {
            force,
            restack: !no_restack,
        }),
        Commands::Parent { branch } => commands::info::run_parent(branch.as_deref()),
        Commands::Children { branch } => commands::info::run_children(branch.as_deref()),
        Commands::Info { branch } => commands::info::run(branch.as_deref()),
        Commands::Up { steps } => commands::navigate::run(Direction::Up(steps.into())),
        Commands::Down { steps } => commands::navigate::run(Direction::Down(steps.into())),
        Commands::Top => commands::navigate::run(Direction::Top),
        Commands::Bottom => commands::navigate::run(Direction::Bottom),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        std::process::exit(report_error(&e));
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Print `e` and return the exit code for it.
fn report_error(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<sprig_core::Error>() {
        Some(sprig_core::Error::Cancelled) => {
            output::info("Cancelled.");
            0
        }
        Some(sprig_core::Error::RebaseConflict { .. }) => {
            output::error(&format!("{e:#}"));
            output::conflict_help();
            1
        }
        _ => {
            output::error(&format!("{e:#}"));
            1
        }
    }
}
