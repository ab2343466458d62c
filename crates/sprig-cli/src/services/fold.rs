//! Fold service: squashing a branch into its parent.
//!
//! The squash merge and its commit are not rolled back. If the commit fails
//! the parent is left with the merged changes staged and
//! [`Error::FoldIncomplete`] tells the user where things stand; metadata has
//! not been touched at that point.

use sprig_core::{Error, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::{load_graph, return_to};

/// Outcome of a fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldResult {
    pub branch: String,
    pub parent: String,
    /// Whether the squash produced a commit.
    pub committed: bool,
    /// Children moved onto `parent`.
    pub reparented: Vec<String>,
    /// Set when the folded branch was kept, to its new parent.
    pub kept_under: Option<String>,
    pub restacked: Vec<RestackStep>,
}

/// Service for fold operations with trait-based dependencies.
pub struct FoldService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> FoldService<'a, G, S> {
    /// Create a new fold service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Check that `branch` can be folded and return its parent.
    pub fn parent_of(&self, branch: &str) -> Result<String> {
        let (trunk, metadata, graph) = load_graph(self.git, self.state)?;
        if branch == trunk {
            return Err(Error::InvalidOperation(format!("cannot fold trunk '{trunk}'")));
        }
        if !metadata.is_tracked(branch) {
            return Err(Error::NotTracked(branch.into()));
        }
        graph
            .parent(branch)
            .map(String::from)
            .ok_or_else(|| Error::MissingParent(branch.into()))
    }

    /// Squash `branch` into its parent.
    ///
    /// Children of `branch` move to the parent, each move saved on its own.
    /// Unless `keep` is set the branch is then deleted and untracked; with
    /// `keep` it moves up to its grandparent (trunk when the parent is
    /// trunk). Finally the parent's children are restacked and the parent is
    /// checked out.
    pub fn run(&self, branch: &str, keep: bool) -> Result<FoldResult> {
        let parent = self.parent_of(branch)?;
        let trunk = self.state.trunk()?;
        let mut metadata = self.state.load_metadata()?;

        self.git.checkout(&parent)?;
        self.git.merge_squash(branch).map_err(|e| {
            tracing::warn!(branch, parent = %parent, error = %e, "squash merge failed");
            Error::MergeConflict {
                branch: branch.into(),
                into: parent.clone(),
            }
        })?;

        let committed = self.git.has_staged_changes()?;
        if committed {
            self.git
                .commit(&format!("Fold '{branch}' into '{parent}'"))
                .map_err(|e| Error::FoldIncomplete {
                    branch: branch.into(),
                    parent: parent.clone(),
                    reason: e.to_string(),
                })?;
        }

        let reparented = metadata.children(branch);
        for child in &reparented {
            metadata.update_parent(child, &parent)?;
            self.state.save_metadata(&metadata)?;
            tracing::info!(branch = %child, parent = %parent, "reparented");
        }

        let kept_under = if keep {
            let grandparent = metadata
                .parent(&parent)
                .map_or_else(|| trunk.clone(), String::from);
            metadata.update_parent(branch, &grandparent)?;
            self.state.save_metadata(&metadata)?;
            Some(grandparent)
        } else {
            self.git
                .delete_branch(branch, true)
                .map_err(|e| Error::FoldIncomplete {
                    branch: branch.into(),
                    parent: parent.clone(),
                    reason: format!("could not delete branch: {e}"),
                })?;
            metadata.untrack(branch);
            self.state.save_metadata(&metadata)?;
            None
        };

        let (_, _, graph) = load_graph(self.git, self.state)?;
        let mut restacked = Vec::new();
        RestackEngine::new(self.git).restack_subtree(&graph, &parent, &mut restacked)?;
        return_to(self.git, &parent);

        Ok(FoldResult {
            branch: branch.into(),
            parent,
            committed,
            reparented,
            kept_under,
            restacked,
        })
    }
}
