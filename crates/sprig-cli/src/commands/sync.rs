//! `sprig sync` command - Update trunk, clean up, and restack everything.

use std::cell::RefCell;

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{SyncOptions, SyncPhase, SyncReport, SyncService, TrunkSync};
use crate::spinner::Spinner;

/// Run the sync command.
pub fn run(opts: SyncOptions) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let original = utils::ensure_on_branch(&repo)?;
    let trunk = sprig_core::StateStore::trunk(&state)?;

    let spinner: RefCell<Option<Spinner>> = RefCell::new(None);
    let progress = |phase: SyncPhase| match phase {
        SyncPhase::Fetching => {
            *spinner.borrow_mut() = Some(Spinner::new("Fetching...", !output::is_quiet()));
        }
        SyncPhase::Fetched => {
            if let Some(spinner) = spinner.borrow_mut().take() {
                spinner.stop();
            }
        }
        SyncPhase::Restacking => output::info("Restacking..."),
        SyncPhase::SyncingTrunk | SyncPhase::CleaningStale | SyncPhase::DeletingMerged => {
            tracing::debug!(?phase, "sync phase");
        }
    };

    let report = SyncService::new(&repo, &state, &TerminalPrompter).run(opts, progress)?;
    print_report(&report, &trunk);

    if let Some(restack) = &report.restack
        && !restack.failed.is_empty()
    {
        output::warn(&format!(
            "Back on {original}; resolve the failed branches with `sprig restack` on each"
        ));
    }

    Ok(())
}

fn print_report(report: &SyncReport, trunk: &str) {
    if let Some(error) = &report.fetch_error {
        output::warn(&format!("Fetch failed, using existing remote refs: {error}"));
    }

    match &report.trunk {
        TrunkSync::NoRemote => output::info(&format!("{trunk} has no remote branch")),
        TrunkSync::UpToDate => output::success(&format!("{} is up to date", trunk.cyan())),
        TrunkSync::FastForwarded => output::success(&format!("Fast-forwarded {}", trunk.cyan())),
        TrunkSync::Reset => output::success(&format!("Reset {} to the remote", trunk.cyan())),
        TrunkSync::Skipped => output::warn(&format!("{trunk} has diverged; left as is")),
        TrunkSync::Failed(reason) => output::warn(&format!("Could not update {trunk}: {reason}")),
    }

    if !report.stale_removed.is_empty() {
        output::info(&format!(
            "Forgot {} branch(es) that no longer exist: {}",
            report.stale_removed.len(),
            report.stale_removed.join(", ")
        ));
    }
    for branch in &report.deleted {
        output::success(&format!("Deleted merged branch {}", branch.cyan()));
    }
    for (branch, reason) in &report.delete_failures {
        output::warn(&format!("Could not delete {branch}: {reason}"));
    }

    if let Some(restack) = &report.restack {
        for branch in &restack.succeeded {
            output::detail(&format!("  {} {}", "✓".green(), branch));
        }
        for branch in &restack.failed {
            output::error(&format!("{branch} has conflicts; its rebase was aborted"));
        }
        if restack.succeeded.is_empty() && restack.failed.is_empty() {
            output::success("All branches up to date");
        } else if restack.failed.is_empty() {
            output::success(&format!("Restacked {} branch(es)", restack.succeeded.len()));
        }
    }
}
