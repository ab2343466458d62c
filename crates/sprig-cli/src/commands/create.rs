//! `sprig create` command - Create a branch on top of the current one.

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::services::CreateService;

/// Options for the create command.
pub struct CreateOptions<'a> {
    /// Name of the new branch.
    pub name: &'a str,
    /// Commit staged changes with this message.
    pub message: Option<&'a str>,
    /// Stage everything before committing.
    pub all: bool,
}

/// Run the create command.
pub fn run(opts: &CreateOptions<'_>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;

    let parent = CreateService::new(&repo, &state).create(opts.name, opts.message, opts.all)?;

    output::success(&format!("Created {} on {}", opts.name.cyan(), parent));
    Ok(())
}
