//! `sprig rename` command - Rename a branch in place.

use anyhow::Result;
use colored::Colorize;
use sprig_core::Prompter;

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{RenameResult, RenameService};

/// Run the rename command.
pub fn run(new_name: Option<&str>, branch: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => utils::ensure_on_branch(&repo)?,
    };

    let new_name = match new_name {
        Some(name) => name.to_string(),
        None => utils::answered(TerminalPrompter.input(
            &format!("New name for '{branch}'"),
            Some(branch.as_str()),
        )?)?,
    };

    match RenameService::new(&repo, &state).rename(&branch, new_name.trim())? {
        RenameResult::Unchanged => output::info("Name unchanged"),
        RenameResult::Renamed {
            old,
            new,
            tracked,
            children,
        } => {
            output::success(&format!("Renamed {} to {}", old, new.cyan()));
            if !tracked && children.is_empty() {
                output::detail("  (not tracked by sprig)");
            }
            for child in &children {
                output::detail(&format!("  {} now on {}", child.cyan(), new));
            }
        }
    }

    Ok(())
}
