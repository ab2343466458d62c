//! `sprig fold` command - Squash the current branch into its parent.

use anyhow::Result;
use colored::Colorize;
use sprig_core::{Error, Prompter};

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::FoldService;

/// Options for the fold command.
pub struct FoldOptions {
    /// Keep the folded branch, moved up one level.
    pub keep: bool,
    /// Skip the confirmation.
    pub force: bool,
}

/// Run the fold command.
pub fn run(opts: &FoldOptions) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = utils::ensure_on_branch(&repo)?;
    let service = FoldService::new(&repo, &state);

    let parent = service.parent_of(&branch)?;
    if !opts.force {
        let question = if opts.keep {
            format!("Squash '{branch}' into '{parent}' and keep '{branch}'?")
        } else {
            format!("Squash '{branch}' into '{parent}' and delete '{branch}'?")
        };
        if !utils::answered(TerminalPrompter.confirm(&question, false)?)? {
            return Err(Error::Cancelled.into());
        }
    }

    let result = service.run(&branch, opts.keep)?;
    if result.committed {
        output::success(&format!(
            "Folded {} into {}",
            result.branch.cyan(),
            result.parent.cyan()
        ));
    } else {
        output::info(&format!(
            "{} had no changes over {}; nothing to commit",
            result.branch, result.parent
        ));
    }
    for child in &result.reparented {
        output::detail(&format!("  {} now on {}", child.cyan(), result.parent));
    }
    match &result.kept_under {
        Some(grandparent) => output::detail(&format!(
            "  {} kept, now on {}",
            result.branch.cyan(),
            grandparent
        )),
        None => output::detail(&format!("  {} deleted", result.branch)),
    }
    output::restack_steps(&result.restacked);

    Ok(())
}
