//! Move service: re-parenting a branch and rebasing it onto its new parent.

use sprig_core::{Error, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, load_graph, return_to, with_rollback};

/// Outcome of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub branch: String,
    pub old_parent: String,
    pub new_parent: String,
    /// Descendants restacked after the move.
    pub restacked: Vec<RestackStep>,
}

/// Service for move operations with trait-based dependencies.
pub struct MoveService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> MoveService<'a, G, S> {
    /// Create a new move service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Branches `source` could be moved onto: trunk first, then tracked
    /// branches that are not `source` or below it. Descriptions name each
    /// candidate's parent.
    pub fn target_candidates(&self, source: &str) -> Result<(Vec<String>, Vec<String>)> {
        let (trunk, _, graph) = load_graph(self.git, self.state)?;

        let below = graph.descendants(source);
        let mut options = vec![trunk.clone()];
        let mut descriptions = vec!["(trunk)".to_string()];
        for name in graph.topological_order() {
            if name == source || below.contains(&name) {
                continue;
            }
            let Some(parent) = graph.parent(&name) else {
                continue;
            };
            descriptions.push(format!("(parent: {parent})"));
            options.push(name);
        }
        Ok((options, descriptions))
    }

    /// Move `source` onto `target`.
    ///
    /// The new parent is saved before the rebase. If the rebase fails it is
    /// aborted, the old parent is restored, and [`Error::RebaseFailed`] is
    /// returned. Descendants of `source` are restacked afterwards; a conflict
    /// there is returned as-is for `sprig continue`.
    pub fn run(&self, source: &str, target: &str) -> Result<MoveResult> {
        let (trunk, mut metadata, graph) = load_graph(self.git, self.state)?;
        let original = current_branch(self.git)?;

        if source == trunk {
            return Err(Error::InvalidOperation("cannot move trunk".into()));
        }
        if !metadata.is_tracked(source) {
            return Err(Error::NotTracked(source.into()));
        }
        if target == source {
            return Err(Error::InvalidOperation(format!(
                "cannot move '{source}' onto itself"
            )));
        }
        if !self.git.branch_exists(target) {
            return Err(Error::BranchNotFound(target.into()));
        }
        if graph.is_descendant(source, target) {
            return Err(Error::CycleWouldForm {
                branch: source.into(),
                target: target.into(),
            });
        }

        let old_parent = metadata.update_parent(source, target)?;
        self.state.save_metadata(&metadata)?;
        tracing::info!(branch = source, from = %old_parent, to = target, "reparented");

        if let Err(e) = self.rebase_onto(source, target) {
            let failure = Error::RebaseFailed {
                branch: source.into(),
                onto: target.into(),
                reason: e.to_string(),
            };
            let rollback = self.restore_parent(&mut metadata, source, &old_parent);
            return_to(self.git, &original);
            return Err(with_rollback(failure, rollback));
        }

        let (_, _, graph) = load_graph(self.git, self.state)?;
        let mut restacked = Vec::new();
        RestackEngine::new(self.git).restack_subtree(&graph, source, &mut restacked)?;
        return_to(self.git, &original);

        Ok(MoveResult {
            branch: source.into(),
            old_parent,
            new_parent: target.into(),
            restacked,
        })
    }

    fn rebase_onto(&self, source: &str, target: &str) -> sprig_git::Result<()> {
        if self.git.current_branch()? != source {
            self.git.checkout(source)?;
        }
        self.git.rebase(source, target)
    }

    fn restore_parent(
        &self,
        metadata: &mut sprig_core::Metadata,
        source: &str,
        old_parent: &str,
    ) -> Result<()> {
        if self.git.is_rebasing() {
            self.git.rebase_abort()?;
        }
        metadata.update_parent(source, old_parent)?;
        self.state.save_metadata(metadata)?;
        tracing::info!(branch = source, parent = old_parent, "restored parent");
        Ok(())
    }
}
