//! `sprig modify` command - Amend the current branch and restack above it.

use anyhow::Result;
use colored::Colorize;

use crate::commands::{restack, utils};
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{ModifyOptions, ModifyOutcome, ModifyService};

/// Run the modify command.
pub fn run(opts: &ModifyOptions) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = utils::ensure_on_branch(&repo)?;

    let mut steps = Vec::new();
    let result = ModifyService::new(&repo, &state, &TerminalPrompter).run(opts, &mut steps);
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            restack::report(&steps);
            return Err(e.into());
        }
    };

    match outcome {
        ModifyOutcome::NothingToCommit => {
            output::info("Nothing to commit");
            return Ok(());
        }
        ModifyOutcome::Amended => output::success(&format!("Amended {}", branch.cyan())),
        ModifyOutcome::Committed { forced: true } => output::success(&format!(
            "Committed to {} (it had no commits to amend)",
            branch.cyan()
        )),
        ModifyOutcome::Committed { forced: false } => {
            output::success(&format!("Committed to {}", branch.cyan()));
        }
    }
    restack::report(&steps);

    Ok(())
}
