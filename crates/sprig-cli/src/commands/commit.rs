//! `sprig commit` command - Commit on the current branch and restack above it.

use anyhow::Result;
use colored::Colorize;

use crate::commands::{restack, utils};
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{CommitOutcome, CommitService, Staging};

/// Run the commit command.
pub fn run(message: Option<&str>, staging: Staging) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;

    let mut steps = Vec::new();
    let result =
        CommitService::new(&repo, &state, &TerminalPrompter).commit(message, staging, &mut steps);
    if result.is_err() {
        restack::report(&steps);
    }

    match result? {
        CommitOutcome::NothingToCommit => output::info("Nothing to commit"),
        CommitOutcome::Committed { branch } => {
            output::success(&format!("Committed to {}", branch.cyan()));
            restack::report(&steps);
        }
    }

    Ok(())
}
