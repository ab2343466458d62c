//! Removal service: untracking or deleting a branch from the middle of a
//! stack.

use sprig_core::{Error, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, load_graph, return_to, with_rollback};

/// Whether the branch ref goes too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    /// Drop the tracking entry only.
    Untrack,
    /// Drop the tracking entry and delete the branch.
    Delete,
}

/// Outcome of a removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalResult {
    pub branch: String,
    pub parent: String,
    pub mode: RemovalMode,
    pub reparented: Vec<String>,
    pub restacked: Vec<RestackStep>,
}

/// Service for untrack and delete with trait-based dependencies.
pub struct RemovalService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> RemovalService<'a, G, S> {
    /// Create a new removal service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Tracked branches with `(parent: x)` or `(current, parent: x)`
    /// descriptions, for interactive selection.
    pub fn candidates(&self) -> Result<(Vec<String>, Vec<String>)> {
        let (_, _, graph) = load_graph(self.git, self.state)?;
        let mut options = Vec::new();
        let mut descriptions = Vec::new();
        for name in graph.topological_order() {
            let Some(parent) = graph.parent(&name) else {
                continue;
            };
            let current = if graph.current() == Some(name.as_str()) {
                "current, "
            } else {
                ""
            };
            descriptions.push(format!("({current}parent: {parent})"));
            options.push(name);
        }
        Ok((options, descriptions))
    }

    /// Validate `branch` and return its parent and direct children.
    pub fn plan(&self, branch: &str, mode: RemovalMode) -> Result<(String, Vec<String>)> {
        let trunk = self.state.trunk()?;
        if branch == trunk {
            return Err(Error::InvalidOperation(format!(
                "cannot remove trunk '{trunk}'"
            )));
        }
        if mode == RemovalMode::Delete && !self.git.branch_exists(branch) {
            return Err(Error::BranchNotFound(branch.into()));
        }
        let metadata = self.state.load_metadata()?;
        let parent = metadata
            .parent(branch)
            .ok_or_else(|| Error::NotTracked(branch.into()))?
            .to_string();
        Ok((parent, metadata.children(branch)))
    }

    /// Remove `branch`, moving its children onto its parent and restacking
    /// them there.
    ///
    /// Metadata is saved once before the ref is deleted. If the delete fails
    /// the saved metadata is put back.
    pub fn run(&self, branch: &str, mode: RemovalMode) -> Result<RemovalResult> {
        let (parent, children) = self.plan(branch, mode)?;
        let original = current_branch(self.git)?;
        let mut metadata = self.state.load_metadata()?;
        let snapshot = metadata.clone();

        let deleting_current = mode == RemovalMode::Delete && original == branch;
        if deleting_current {
            self.git.checkout(&parent)?;
        }

        for child in &children {
            metadata.update_parent(child, &parent)?;
            tracing::info!(branch = %child, parent = %parent, "reparented");
        }
        metadata.untrack(branch);
        self.state.save_metadata(&metadata)?;

        if mode == RemovalMode::Delete {
            if let Err(e) = self.git.delete_branch(branch, true) {
                let rollback = self.state.save_metadata(&snapshot);
                return_to(self.git, &original);
                return Err(with_rollback(e.into(), rollback));
            }
            tracing::info!(branch, "deleted");
        }

        let (_, _, graph) = load_graph(self.git, self.state)?;
        let engine = RestackEngine::new(self.git);
        let mut restacked = Vec::new();
        for child in &children {
            if graph.parent(child).is_none() {
                continue;
            }
            engine.restack_branch(&graph, child, &mut restacked)?;
        }

        return_to(self.git, if deleting_current { &parent } else { &original });

        Ok(RemovalResult {
            branch: branch.into(),
            parent,
            mode,
            reparented: children,
            restacked,
        })
    }
}
