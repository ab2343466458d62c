//! Split service: carving a new parent branch out of the current branch.
//!
//! The new branch starts from the current branch's parent and receives part
//! of its changes; the current branch is then re-parented onto it and
//! rebased. Any failure before the rebase lands deletes the new branch,
//! restores metadata and returns to the original branch.

use std::collections::HashSet;

use sprig_core::{BranchName, Error, Metadata, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::{CommitSummary, GitOps, Oid};

use super::{current_branch, load_graph, return_to, with_rollback};

/// How to choose what goes to the new branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// The oldest commits.
    ByCommit,
    /// Hunks picked with `git add --patch`.
    ByHunk,
    /// Files matching the given pathspecs.
    ByFile(Vec<String>),
}

/// The branch being split and the commits it has over its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAnalysis {
    pub branch: String,
    pub parent: String,
    /// Oldest first.
    pub commits: Vec<CommitSummary>,
}

impl SplitAnalysis {
    /// Mode to use without asking, if the branch leaves only one choice.
    #[must_use]
    pub fn default_mode(&self) -> Option<SplitMode> {
        (self.commits.len() == 1).then_some(SplitMode::ByHunk)
    }
}

/// Outcome of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    pub branch: String,
    pub new_branch: String,
    pub parent: String,
    /// Descendants of `branch` restacked afterwards.
    pub restacked: Vec<RestackStep>,
}

/// Service for split operations with trait-based dependencies.
pub struct SplitService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> SplitService<'a, G, S> {
    /// Create a new split service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Inspect the current branch.
    ///
    /// # Errors
    /// Fails on trunk, on an untracked branch, with a dirty working tree, or
    /// when the branch has no commits of its own.
    pub fn analyze(&self) -> Result<SplitAnalysis> {
        let (trunk, metadata, graph) = load_graph(self.git, self.state)?;
        let branch = current_branch(self.git)?;

        if branch == trunk {
            return Err(Error::InvalidOperation("cannot split trunk".into()));
        }
        if !metadata.is_tracked(&branch) {
            return Err(Error::NotTracked(branch));
        }
        let parent = graph
            .parent(&branch)
            .ok_or_else(|| Error::MissingParent(branch.clone()))?
            .to_string();
        if !self.git.is_clean()? {
            return Err(Error::DirtyWorkingTree);
        }

        let commits = self.git.commits_between(&parent, &branch)?;
        if commits.is_empty() {
            return Err(Error::NothingSelected(format!(
                "'{branch}' has no commits to split"
            )));
        }

        Ok(SplitAnalysis {
            branch,
            parent,
            commits,
        })
    }

    /// Move the oldest commits, `selected`, to a new branch `new_name`.
    ///
    /// The selection must be a gap-free prefix of the branch's commits and
    /// must leave at least one commit behind.
    pub fn by_commit(
        &self,
        analysis: &SplitAnalysis,
        new_name: &str,
        selected: &[Oid],
    ) -> Result<SplitResult> {
        let new = self.check_name(new_name)?;
        let commits = &analysis.commits;

        if commits.len() < 2 {
            return Err(Error::InvalidOperation(
                "need at least 2 commits to split by commit".into(),
            ));
        }
        if selected.is_empty() {
            return Err(Error::NothingSelected("no commits selected".into()));
        }
        if selected.len() >= commits.len() {
            return Err(Error::InvalidOperation(
                "cannot move every commit to the new branch".into(),
            ));
        }
        let chosen: HashSet<&Oid> = selected.iter().collect();
        let prefix: HashSet<&Oid> = commits[..selected.len()].iter().map(|c| &c.oid).collect();
        if chosen != prefix {
            return Err(Error::InvalidOperation(
                "selected commits must be the oldest ones, without gaps".into(),
            ));
        }

        let split_point = commits[selected.len() - 1].oid.to_string();
        let branch = analysis.branch.as_str();
        let mut metadata = self.state.load_metadata()?;
        let snapshot = metadata.clone();

        self.git.create_branch_at(&new, &split_point)?;
        tracing::info!(branch = %new, at = %split_point, "created split branch");

        self.adopt(&mut metadata, analysis, &new)
            .and_then(|()| {
                self.git
                    .rebase_onto_from(branch, &new, &split_point)
                    .map_err(Error::from)
            })
            .map_err(|e| self.abandon(analysis, &new, Some(&snapshot), &e))?;

        self.finish(analysis, &new)
    }

    /// Move interactively chosen hunks to a new branch `new_name`.
    pub fn by_hunk(&self, analysis: &SplitAnalysis, new_name: &str) -> Result<SplitResult> {
        let new = self.check_name(new_name)?;
        let message = format!("Split from {}", analysis.branch);
        self.carve(analysis, &new, &message, "no changes selected for the new branch", || {
            self.git.stage_interactive()
        })
    }

    /// Move files matching `patterns` to a new branch `new_name`.
    pub fn by_file(
        &self,
        analysis: &SplitAnalysis,
        new_name: &str,
        patterns: &[String],
    ) -> Result<SplitResult> {
        if patterns.is_empty() {
            return Err(Error::NothingSelected("no file patterns given".into()));
        }
        let new = self.check_name(new_name)?;
        let joined = patterns.join(", ");
        let message = format!("Split files ({joined}) from {}", analysis.branch);
        let nothing = format!("no files matched {joined}");
        self.carve(analysis, &new, &message, &nothing, || {
            for pattern in patterns {
                if let Err(e) = self.git.stage_pathspec(pattern) {
                    tracing::warn!(pattern = %pattern, error = %e, "pattern staged nothing");
                }
            }
            Ok(())
        })
    }

    fn check_name(&self, name: &str) -> Result<String> {
        let name = BranchName::new(name.trim())?;
        if self.git.branch_exists(&name) {
            return Err(Error::BranchExists(name.into_inner()));
        }
        Ok(name.into_inner())
    }

    /// Shared hunk/file flow: replay the branch's changes unstaged onto a new
    /// branch from the parent, let `stage` pick some, commit them.
    fn carve(
        &self,
        analysis: &SplitAnalysis,
        new: &str,
        message: &str,
        nothing_selected: &str,
        stage: impl FnOnce() -> sprig_git::Result<()>,
    ) -> Result<SplitResult> {
        let branch = analysis.branch.as_str();
        let parent = analysis.parent.as_str();
        let head = self.git.commit_ref(branch)?.to_string();

        self.git.checkout_new_branch(new, parent)?;
        tracing::info!(branch = new, from = parent, "created split branch");

        if let Err(e) = self.git.cherry_pick_no_commit(parent, &head) {
            if let Err(abort) = self.git.cherry_pick_abort() {
                tracing::warn!(error = %abort, "cherry-pick abort failed");
            }
            return Err(self.abandon(analysis, new, None, &e.into()));
        }

        let staged = self
            .git
            .unstage_all()
            .and_then(|()| stage())
            .and_then(|()| self.git.has_staged_changes())
            .map_err(|e| self.abandon(analysis, new, None, &e.into()))?;
        if !staged {
            let reason = Error::NothingSelected(nothing_selected.into());
            return Err(match self.cleanup(analysis, new, None) {
                Ok(()) => reason,
                Err(rollback) => reason.with_rollback_failure(rollback),
            });
        }

        self.git
            .commit(message)
            .and_then(|()| self.git.discard_unstaged())
            .map_err(|e| self.abandon(analysis, new, None, &e.into()))?;

        let mut metadata = self.state.load_metadata()?;
        let snapshot = metadata.clone();
        self.adopt(&mut metadata, analysis, new)
            .and_then(|()| self.git.checkout(branch).map_err(Error::from))
            .and_then(|()| self.git.rebase(branch, new).map_err(Error::from))
            .map_err(|e| self.abandon(analysis, new, Some(&snapshot), &e))?;

        self.finish(analysis, new)
    }

    /// Track `new` under the old parent and put the split branch on top of it.
    fn adopt(&self, metadata: &mut Metadata, analysis: &SplitAnalysis, new: &str) -> Result<()> {
        metadata.track(new, &analysis.parent)?;
        metadata.update_parent(&analysis.branch, new)?;
        self.state.save_metadata(metadata)?;
        tracing::info!(branch = %analysis.branch, parent = new, "reparented");
        Ok(())
    }

    fn finish(&self, analysis: &SplitAnalysis, new: &str) -> Result<SplitResult> {
        let (_, _, graph) = load_graph(self.git, self.state)?;
        let mut restacked = Vec::new();
        RestackEngine::new(self.git).restack_subtree(&graph, &analysis.branch, &mut restacked)?;
        return_to(self.git, &analysis.branch);

        Ok(SplitResult {
            branch: analysis.branch.clone(),
            new_branch: new.into(),
            parent: analysis.parent.clone(),
            restacked,
        })
    }

    /// Clean up after `cause` and describe it as an aborted split.
    fn abandon(
        &self,
        analysis: &SplitAnalysis,
        new: &str,
        snapshot: Option<&Metadata>,
        cause: &Error,
    ) -> Error {
        tracing::warn!(branch = %analysis.branch, error = %cause, "split failed, cleaning up");
        let aborted = Error::SplitAborted(cause.to_string());
        with_rollback(aborted, self.cleanup(analysis, new, snapshot))
    }

    /// Undo whatever a split got through: stop a rebase, drop leftovers on
    /// the new branch, go back, delete the new branch, restore metadata.
    fn cleanup(&self, analysis: &SplitAnalysis, new: &str, snapshot: Option<&Metadata>) -> Result<()> {
        if self.git.is_rebasing() {
            self.git.rebase_abort()?;
        }
        if self.git.current_branch().ok().as_deref() == Some(new) {
            self.git.discard_unstaged()?;
        }
        self.git.checkout(&analysis.branch)?;
        if self.git.branch_exists(new) {
            self.git.delete_branch(new, true)?;
        }
        if let Some(snapshot) = snapshot {
            self.state.save_metadata(snapshot)?;
        }
        Ok(())
    }
}
