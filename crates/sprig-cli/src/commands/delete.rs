//! `sprig delete` command - Delete a branch and close the gap in its stack.

use anyhow::Result;
use colored::Colorize;
use sprig_core::{Error, Prompter};

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{RemovalMode, RemovalResult, RemovalService};

/// Run the delete command.
pub fn run(branch: Option<&str>, force: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let service = RemovalService::new(&repo, &state);

    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => {
            let (options, descriptions) = service.candidates()?;
            if options.is_empty() {
                output::info("No tracked branches to delete");
                return Ok(());
            }
            utils::answered(TerminalPrompter.select_one(
                "Branch to delete",
                &options,
                Some(descriptions.as_slice()),
            )?)?
        }
    };

    let (parent, children) = service.plan(&branch, RemovalMode::Delete)?;
    if !force {
        confirm_removal(
            &TerminalPrompter,
            &format!("Delete '{branch}'? Unmerged commits on it will be lost."),
            &parent,
            &children,
        )?;
    }

    let result = service.run(&branch, RemovalMode::Delete)?;
    print_removal(&result);

    Ok(())
}

/// Show which children will move, then ask `question`.
///
/// Declining counts as cancelling.
pub fn confirm_removal(
    prompter: &impl Prompter,
    question: &str,
    parent: &str,
    children: &[String],
) -> Result<()> {
    if !children.is_empty() {
        output::info(&format!("These branches will move onto {parent}:"));
        for child in children {
            output::detail(&format!("  {child}"));
        }
    }
    if utils::answered(prompter.confirm(question, false)?)? {
        Ok(())
    } else {
        Err(Error::Cancelled.into())
    }
}

/// Report a finished delete or untrack.
pub fn print_removal(result: &RemovalResult) {
    let verb = match result.mode {
        RemovalMode::Delete => "Deleted",
        RemovalMode::Untrack => "Untracked",
    };
    output::success(&format!("{verb} {}", result.branch.cyan()));
    for child in &result.reparented {
        output::detail(&format!("  {} now on {}", child.cyan(), result.parent));
    }
    output::restack_steps(&result.restacked);
}
