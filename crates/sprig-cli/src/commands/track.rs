//! `sprig track` command - Start tracking an existing branch.

use anyhow::Result;
use colored::Colorize;
use sprig_core::Prompter;

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::TrackService;

/// Run the track command.
pub fn run(branch: Option<&str>, parent: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => utils::ensure_on_branch(&repo)?,
    };
    let service = TrackService::new(&repo, &state);

    let parent = match parent {
        Some(parent) => parent.to_string(),
        None => {
            let (options, descriptions) = service.parent_candidates(&branch)?;
            utils::answered(TerminalPrompter.select_one(
                &format!("Parent of '{branch}'"),
                &options,
                Some(descriptions.as_slice()),
            )?)?
        }
    };

    service.track(&branch, &parent)?;
    output::success(&format!("Tracking {} on {}", branch.cyan(), parent));

    Ok(())
}
