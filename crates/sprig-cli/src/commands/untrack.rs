//! `sprig untrack` command - Stop tracking a branch without deleting it.

use anyhow::Result;

use crate::commands::{delete, utils};
use crate::prompt::TerminalPrompter;
use crate::services::{RemovalMode, RemovalService};

/// Run the untrack command.
pub fn run(branch: Option<&str>, force: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => utils::ensure_on_branch(&repo)?,
    };
    let service = RemovalService::new(&repo, &state);

    let (parent, children) = service.plan(&branch, RemovalMode::Untrack)?;
    if !force {
        delete::confirm_removal(
            &TerminalPrompter,
            &format!("Stop tracking '{branch}'?"),
            &parent,
            &children,
        )?;
    }

    let result = service.run(&branch, RemovalMode::Untrack)?;
    delete::print_removal(&result);

    Ok(())
}
