//! `sprig restack` command - Rebase branches onto their parents.

use anyhow::Result;
use sprig_core::{RestackOutcome, RestackStep};

use crate::commands::utils;
use crate::output;
use crate::services::RestackService;

/// Run the restack command.
pub fn run(only: bool) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;

    let mut steps = Vec::new();
    let result = RestackService::new(&repo, &state).restack(only, &mut steps);
    report(&steps);
    result?;

    Ok(())
}

/// Print the steps taken, then a one-line summary.
///
/// Steps are printed even when a conflict cut the walk short.
pub fn report(steps: &[RestackStep]) {
    output::restack_steps(steps);
    let rebased = steps
        .iter()
        .filter(|s| s.outcome == RestackOutcome::Restacked)
        .count();
    match rebased {
        0 if steps.is_empty() => {}
        0 => output::success("Everything is up to date"),
        1 => output::success("Restacked 1 branch"),
        n => output::success(&format!("Restacked {n} branches")),
    }
}
