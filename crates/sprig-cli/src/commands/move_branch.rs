//! `sprig move` command - Move a branch onto a different parent.

use anyhow::Result;
use colored::Colorize;
use sprig_core::Prompter;

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::MoveService;

/// Options for the move command.
pub struct MoveOptions<'a> {
    /// New parent; prompted when `None`.
    pub target: Option<&'a str>,
    /// Branch to move; the current branch when `None`.
    pub source: Option<&'a str>,
}

/// Run the move command.
pub fn run(opts: &MoveOptions<'_>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let current = utils::ensure_on_branch(&repo)?;
    let source = opts.source.map_or(current, String::from);
    let service = MoveService::new(&repo, &state);

    let target = match opts.target {
        Some(target) => target.to_string(),
        None => {
            let (options, descriptions) = service.target_candidates(&source)?;
            utils::answered(TerminalPrompter.select_one(
                &format!("Move '{source}' onto"),
                &options,
                Some(descriptions.as_slice()),
            )?)?
        }
    };

    let result = service.run(&source, &target)?;
    output::success(&format!(
        "Moved {} from {} onto {}",
        result.branch.cyan(),
        result.old_parent,
        result.new_parent
    ));
    output::restack_steps(&result.restacked);

    Ok(())
}
