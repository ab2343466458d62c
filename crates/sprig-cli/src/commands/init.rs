//! `sprig init` command - Initialize sprig in the current repository.

use anyhow::{Result, bail};
use colored::Colorize;
use sprig_core::{Error, Prompter, State, StateStore, TrunkConfig};
use sprig_git::{GitOps, Repository};

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;

/// Branch names offered first when picking a trunk.
const USUAL_TRUNKS: [&str; 2] = ["main", "master"];

/// Run the init command.
pub fn run(trunk: Option<&str>) -> Result<()> {
    let repo = utils::open_repo()?;
    let state = State::new(repo.common_dir()?)?;

    if state.is_initialized() {
        let config = state.load_config()?;
        return Err(Error::AlreadyInitialized(config.trunk).into());
    }

    let trunk = match trunk {
        Some(trunk) => trunk.to_string(),
        None => pick_trunk(&repo, &TerminalPrompter)?,
    };
    if !repo.branch_exists(&trunk) {
        return Err(Error::BranchNotFound(trunk).into());
    }

    state.init(&TrunkConfig::new(trunk.clone()))?;
    tracing::info!(trunk = %trunk, "initialized");

    output::success(&format!("Initialized sprig with trunk {}", trunk.cyan()));
    output::info(&format!("State stored in: {}", state.sprig_dir().display()));

    Ok(())
}

fn pick_trunk(repo: &Repository, prompter: &impl Prompter) -> Result<String> {
    let branches = repo.list_branches()?;
    if branches.is_empty() {
        bail!("No branches yet - make a first commit before running `sprig init`");
    }
    let options = trunk_options(branches);
    utils::answered(prompter.select_one("Trunk branch", &options, None)?)
}

/// `main` and `master` first, then everything else in name order.
fn trunk_options(mut branches: Vec<String>) -> Vec<String> {
    branches.sort_by_key(|b| {
        (
            USUAL_TRUNKS
                .iter()
                .position(|usual| *usual == b.as_str())
                .unwrap_or(USUAL_TRUNKS.len()),
            b.clone(),
        )
    });
    branches
}
