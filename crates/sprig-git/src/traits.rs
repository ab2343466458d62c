//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait, the only surface through which
//! sprig talks to the version-control engine. Services take it as a generic
//! parameter so tests can substitute an in-memory implementation.

use git2::Oid;

use crate::Result;

/// One commit in a range, as shown to users picking split points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Full commit id.
    pub oid: Oid,
    /// Abbreviated id (7 characters).
    pub short_id: String,
    /// First line of the commit message.
    pub summary: String,
}

impl CommitSummary {
    /// Build a summary from an id and a message, abbreviating both.
    #[must_use]
    pub fn new(oid: Oid, message: &str) -> Self {
        let id = oid.to_string();
        Self {
            oid,
            short_id: id[..7.min(id.len())].to_string(),
            summary: message.lines().next().unwrap_or_default().to_string(),
        }
    }

    /// Label used in selection prompts: `<short id> <summary>`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.short_id, self.summary)
    }
}

/// Trait for git repository operations.
///
/// All calls block until git has finished. Errors carry the branch or
/// command involved; callers only distinguish success from failure.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Get the current branch name.
    ///
    /// Returns an error if HEAD is detached.
    fn current_branch(&self) -> Result<String>;

    /// Check if a rebase is in progress.
    fn is_rebasing(&self) -> bool;

    /// Branch being rebased while a rebase is stopped.
    fn rebasing_branch(&self) -> Option<String>;

    // === Branch Operations ===

    /// List all local branches.
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Check if a local branch exists.
    fn branch_exists(&self, name: &str) -> bool;

    /// Create a new branch at `start` without checking it out.
    fn create_branch_at(&self, name: &str, start: &str) -> Result<()>;

    /// Checkout a branch.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create a branch at `start` and check it out.
    fn checkout_new_branch(&self, name: &str, start: &str) -> Result<()>;

    /// Delete a local branch; `force` deletes it even if unmerged.
    fn delete_branch(&self, name: &str, force: bool) -> Result<()>;

    /// Rename a local branch.
    fn rename_branch(&self, old: &str, new: &str) -> Result<()>;

    // === Revisions ===

    /// Resolve a revision (branch, remote ref, sha) to a commit id.
    fn commit_ref(&self, rev: &str) -> Result<Oid>;

    /// Find the merge base of two revisions.
    fn merge_base(&self, one: &str, two: &str) -> Result<Oid>;

    /// Check whether `ancestor` is reachable from `descendant`.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// The commit `rev` points at.
    fn commit_summary(&self, rev: &str) -> Result<CommitSummary>;

    /// Commits reachable from `tip` but not from `base`, oldest first.
    fn commits_between(&self, base: &str, tip: &str) -> Result<Vec<CommitSummary>>;

    /// Check whether `branch` is fully merged into `target`.
    fn is_merged_into(&self, branch: &str, target: &str) -> Result<bool>;

    // === Working Directory ===

    /// Check if the working directory has no changes (untracked included).
    fn is_clean(&self) -> Result<bool>;

    /// Check if the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool>;

    /// Check if tracked files differ from the index.
    fn has_unstaged_changes(&self) -> Result<bool>;

    /// Stage every change in the working tree.
    fn stage_all(&self) -> Result<()>;

    /// Stage paths matching a pathspec pattern.
    fn stage_pathspec(&self, pattern: &str) -> Result<()>;

    /// Let the user pick hunks to stage interactively.
    fn stage_interactive(&self) -> Result<()>;

    /// Unstage everything, keeping working tree changes.
    fn unstage_all(&self) -> Result<()>;

    /// Throw away unstaged modifications and untracked files.
    fn discard_unstaged(&self) -> Result<()>;

    /// Commit the staged changes.
    fn commit(&self, message: &str) -> Result<()>;

    /// Amend HEAD with the staged changes, keeping its message unless one is given.
    fn commit_amend(&self, message: Option<&str>) -> Result<()>;

    // === Merge / Cherry-pick ===

    /// Squash-merge `branch` into the current branch without committing.
    fn merge_squash(&self, branch: &str) -> Result<()>;

    /// Fast-forward the current branch to `rev`.
    fn merge_ff_only(&self, rev: &str) -> Result<()>;

    /// Apply the changes of `base..tip` to the working tree without committing.
    fn cherry_pick_no_commit(&self, base: &str, tip: &str) -> Result<()>;

    /// Abort a cherry-pick in progress.
    fn cherry_pick_abort(&self) -> Result<()>;

    // === Rebase Operations ===

    /// Rebase `branch` onto `onto` (checks `branch` out).
    fn rebase(&self, branch: &str, onto: &str) -> Result<()>;

    /// Rebase the commits of `branch` after `upstream` onto `onto`.
    fn rebase_onto_from(&self, branch: &str, onto: &str, upstream: &str) -> Result<()>;

    /// Abort a rebase in progress.
    fn rebase_abort(&self) -> Result<()>;

    /// Continue a rebase after resolving conflicts.
    fn rebase_continue(&self) -> Result<()>;

    // === Remote Operations ===

    /// Fetch `remote`, pruning deleted refs.
    fn fetch_remote(&self, remote: &str) -> Result<()>;

    /// Check if `remote/branch` exists as a remote-tracking branch.
    fn has_remote_branch(&self, branch: &str, remote: &str) -> bool;

    /// Point `branch` at `rev`, hard-resetting the working tree if it is checked out.
    fn reset_branch(&self, branch: &str, rev: &str) -> Result<()>;
}
