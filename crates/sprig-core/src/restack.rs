//! Restacking: keeping each branch on top of its parent's tip.
//!
//! A branch is stale when `merge-base(branch, parent)` differs from the
//! parent's tip. [`RestackEngine::restack_subtree`] stops at the first
//! conflict and leaves the rebase in progress for the user to resolve.
//! [`RestackEngine::restack_all_best_effort`] aborts conflicted rebases and
//! keeps going, reporting what failed.

use sprig_git::GitOps;

use crate::error::{Error, Result};
use crate::graph::BranchGraph;

/// Result of restacking a single branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestackOutcome {
    /// Already based on the parent's tip.
    UpToDate,
    /// Rebased onto the parent's tip.
    Restacked,
}

/// One branch visited during a recursive restack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestackStep {
    pub branch: String,
    pub parent: String,
    pub outcome: RestackOutcome,
}

/// Per-branch results of a best-effort restack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestackReport {
    /// Branches rebased successfully.
    pub succeeded: Vec<String>,
    /// Branches that needed nothing.
    pub up_to_date: Vec<String>,
    /// Branches whose rebase failed and was aborted.
    pub failed: Vec<String>,
}

impl RestackReport {
    /// Whether any branch failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Sequences rebases over a [`BranchGraph`].
pub struct RestackEngine<'a, G: GitOps> {
    git: &'a G,
}

impl<'a, G: GitOps> RestackEngine<'a, G> {
    /// Create an engine over `git`.
    pub const fn new(git: &'a G) -> Self {
        Self { git }
    }

    /// Whether `branch` no longer sits on `parent`'s tip.
    ///
    /// # Errors
    /// Returns [`Error::RefResolution`] if either side cannot be resolved.
    pub fn needs_restack(&self, branch: &str, parent: &str) -> Result<bool> {
        let base = self
            .git
            .merge_base(branch, parent)
            .map_err(|e| ref_error(branch, parent, &e))?;
        let tip = self.git.commit_ref(parent).map_err(|e| Error::RefResolution {
            reference: parent.into(),
            reason: e.to_string(),
        })?;
        Ok(base != tip)
    }

    /// Rebase `branch` onto `parent` if it is stale.
    ///
    /// # Errors
    /// Returns [`Error::RebaseConflict`] if the rebase stops on conflicts;
    /// the rebase is left in progress.
    pub fn restack_one(&self, branch: &str, parent: &str) -> Result<RestackOutcome> {
        if !self.needs_restack(branch, parent)? {
            tracing::debug!(branch, parent, "up to date");
            return Ok(RestackOutcome::UpToDate);
        }

        tracing::info!(branch, parent, "restacking");
        self.git
            .rebase(branch, parent)
            .map_err(|e| rebase_error(branch, parent, e))?;
        Ok(RestackOutcome::Restacked)
    }

    /// Restack every descendant of `parent`, parents before children.
    ///
    /// Each child is checked out and restacked; its own children are only
    /// visited once it succeeds. Steps completed before a conflict are left
    /// in `steps`.
    ///
    /// # Errors
    /// Returns the first conflict; unvisited siblings are left alone.
    pub fn restack_subtree(
        &self,
        graph: &BranchGraph,
        parent: &str,
        steps: &mut Vec<RestackStep>,
    ) -> Result<()> {
        for child in graph.children(parent) {
            self.git.checkout(child)?;
            let outcome = self.restack_one(child, parent)?;
            steps.push(RestackStep {
                branch: child.clone(),
                parent: parent.into(),
                outcome,
            });
            self.restack_subtree(graph, child, steps)?;
        }
        Ok(())
    }

    /// Restack every stack rooted at trunk.
    ///
    /// # Errors
    /// Returns the first conflict.
    pub fn restack_from_trunk(
        &self,
        graph: &BranchGraph,
        steps: &mut Vec<RestackStep>,
    ) -> Result<()> {
        self.restack_subtree(graph, graph.trunk(), steps)
    }

    /// Restack `branch` onto its parent, then all of its descendants.
    ///
    /// # Errors
    /// Returns [`Error::MissingParent`] if `branch` has no parent in the
    /// graph, or the first conflict.
    pub fn restack_branch(
        &self,
        graph: &BranchGraph,
        branch: &str,
        steps: &mut Vec<RestackStep>,
    ) -> Result<()> {
        if graph.is_trunk(branch) {
            return self.restack_from_trunk(graph, steps);
        }
        let parent = graph
            .parent(branch)
            .ok_or_else(|| Error::MissingParent(branch.into()))?;

        self.git.checkout(branch)?;
        let outcome = self.restack_one(branch, parent)?;
        steps.push(RestackStep {
            branch: branch.into(),
            parent: parent.into(),
            outcome,
        });
        self.restack_subtree(graph, branch, steps)
    }

    /// Restack every branch in topological order, skipping over failures.
    ///
    /// A failed rebase is aborted and recorded; later branches (including the
    /// failed branch's children) are still attempted.
    pub fn restack_all_best_effort(&self, graph: &BranchGraph) -> RestackReport {
        let mut report = RestackReport::default();

        for branch in graph.topological_order() {
            let Some(parent) = graph.parent(&branch) else {
                continue;
            };

            match self.restack_one(&branch, parent) {
                Ok(RestackOutcome::Restacked) => report.succeeded.push(branch),
                Ok(RestackOutcome::UpToDate) => report.up_to_date.push(branch),
                Err(e) => {
                    tracing::warn!(branch = %branch, parent, error = %e, "restack failed");
                    if self.git.is_rebasing() {
                        if let Err(abort) = self.git.rebase_abort() {
                            tracing::warn!(branch = %branch, error = %abort, "rebase abort failed");
                        }
                    }
                    report.failed.push(branch);
                }
            }
        }

        report
    }
}

fn ref_error(branch: &str, parent: &str, err: &sprig_git::Error) -> Error {
    Error::RefResolution {
        reference: format!("{branch}...{parent}"),
        reason: err.to_string(),
    }
}

fn rebase_error(branch: &str, parent: &str, err: sprig_git::Error) -> Error {
    match err {
        sprig_git::Error::RebaseConflict(_) => Error::RebaseConflict {
            branch: branch.into(),
            parent: parent.into(),
        },
        other => Error::RebaseFailed {
            branch: branch.into(),
            onto: parent.into(),
            reason: other.to_string(),
        },
    }
}
