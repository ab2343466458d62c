//! Service layer for business logic with dependency injection.
//!
//! Services take `GitOps`, `StateStore` and (where a decision is needed
//! mid-operation) `Prompter` implementations, so every structural edit can be
//! exercised against the mocks in `test_mocks`.

pub mod commit;
pub mod create;
pub mod fold;
pub mod info;
pub mod modify;
pub mod move_branch;
pub mod navigate;
pub mod remove;
pub mod rename;
pub mod restack;
pub mod split;
pub mod sync;
pub mod track;

#[cfg(test)]
pub mod test_mocks;

pub use commit::{CommitAction, CommitOutcome, CommitService, Staging};
pub use create::CreateService;
pub use fold::{FoldResult, FoldService};
pub use info::{BranchInfo, InfoService};
pub use modify::{ModifyOptions, ModifyOutcome, ModifyService};
pub use move_branch::{MoveResult, MoveService};
pub use navigate::{Navigation, NavigateService};
pub use remove::{RemovalMode, RemovalResult, RemovalService};
pub use rename::{RenameResult, RenameService};
pub use restack::{ContinueOutcome, RestackService};
pub use split::{SplitAnalysis, SplitMode, SplitResult, SplitService};
pub use sync::{MergedAnswer, SyncOptions, SyncPhase, SyncReport, SyncService, TrunkSync};
pub use track::TrackService;

use sprig_core::{BranchGraph, Error, Metadata, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::GitOps;

/// Load trunk and metadata and build a validated graph.
pub fn load_graph<G: GitOps, S: StateStore>(
    git: &G,
    state: &S,
) -> Result<(String, Metadata, BranchGraph)> {
    let trunk = state.trunk()?;
    let metadata = state.load_metadata()?;
    let graph = BranchGraph::from_repo(git, &trunk, &metadata)?;
    graph.validate()?;
    Ok((trunk, metadata, graph))
}

/// Combine an error with the outcome of its compensating action.
pub fn with_rollback(original: Error, rollback: Result<()>) -> Error {
    match rollback {
        Ok(()) => original,
        Err(e) => original.with_rollback_failure(e),
    }
}

/// Check out `branch` if it still exists and is not already current.
///
/// Failures are logged, never raised.
pub fn return_to<G: GitOps>(git: &G, branch: &str) {
    if !git.branch_exists(branch) {
        return;
    }
    if git.current_branch().ok().as_deref() == Some(branch) {
        return;
    }
    if let Err(e) = git.checkout(branch) {
        tracing::warn!(branch, error = %e, "could not return to branch");
    }
}

/// Restack every descendant of `branch` after its tip moved, then return to it.
///
/// Completed steps are left in `steps` when a conflict stops the walk.
pub fn restack_children<G: GitOps, S: StateStore>(
    git: &G,
    state: &S,
    branch: &str,
    steps: &mut Vec<RestackStep>,
) -> Result<()> {
    let (_, _, graph) = load_graph(git, state)?;
    RestackEngine::new(git).restack_subtree(&graph, branch, steps)?;
    return_to(git, branch);
    Ok(())
}

/// Current branch, with detached HEAD surfaced as a core error.
pub fn current_branch<G: GitOps>(git: &G) -> Result<String> {
    Ok(git.current_branch()?)
}
