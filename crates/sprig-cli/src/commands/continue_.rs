//! `sprig continue` command - Resume after resolving a rebase conflict.

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::services::{ContinueOutcome, RestackService};

/// Run the continue command.
pub fn run() -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;

    let mut steps = Vec::new();
    let result = RestackService::new(&repo, &state).continue_after_conflict(&mut steps);
    output::restack_steps(&steps);

    match result? {
        ContinueOutcome::NothingInProgress => output::info("No rebase in progress"),
        ContinueOutcome::Completed { branch } => {
            output::success(&format!("Finished rebasing {}", branch.cyan()));
        }
    }

    Ok(())
}
