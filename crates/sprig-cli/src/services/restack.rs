//! Restack service: rebasing the current branch and its descendants, and
//! resuming after the user resolved a conflict.

use sprig_core::{Error, RestackEngine, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, load_graph, restack_children, return_to};

/// What `continue` found to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// No rebase was stopped.
    NothingInProgress,
    /// The stopped rebase finished and descendants were restacked.
    Completed { branch: String },
}

/// Service for restack operations with trait-based dependencies.
pub struct RestackService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> RestackService<'a, G, S> {
    /// Create a new restack service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Restack the current branch onto its parent, then its descendants.
    ///
    /// On trunk every stack is restacked. With `only`, descendants are left
    /// alone. Completed steps are pushed to `steps` even when a conflict
    /// stops the walk.
    pub fn restack(&self, only: bool, steps: &mut Vec<RestackStep>) -> Result<()> {
        let (trunk, metadata, graph) = load_graph(self.git, self.state)?;
        let current = current_branch(self.git)?;
        let engine = RestackEngine::new(self.git);

        if current == trunk {
            if only {
                return Err(Error::InvalidOperation(format!(
                    "'{trunk}' is trunk and has no parent to restack onto"
                )));
            }
            engine.restack_from_trunk(&graph, steps)?;
        } else {
            if !metadata.is_tracked(&current) {
                return Err(Error::NotTracked(current));
            }
            if only {
                let parent = graph
                    .parent(&current)
                    .ok_or_else(|| Error::MissingParent(current.clone()))?;
                let outcome = engine.restack_one(&current, parent)?;
                steps.push(RestackStep {
                    branch: current.clone(),
                    parent: parent.to_string(),
                    outcome,
                });
            } else {
                engine.restack_branch(&graph, &current, steps)?;
            }
        }

        return_to(self.git, &current);
        Ok(())
    }

    /// Finish a stopped rebase, then restack the rebased branch's descendants.
    pub fn continue_after_conflict(&self, steps: &mut Vec<RestackStep>) -> Result<ContinueOutcome> {
        if !self.git.is_rebasing() {
            return Ok(ContinueOutcome::NothingInProgress);
        }

        let branch = self.git.rebasing_branch().ok_or_else(|| {
            Error::InvalidOperation("cannot tell which branch is being rebased".into())
        })?;
        let parent = {
            let metadata = self.state.load_metadata()?;
            match metadata.parent(&branch) {
                Some(parent) => parent.to_string(),
                None => self.state.trunk()?,
            }
        };

        tracing::info!(branch = %branch, "continuing rebase");
        self.git.rebase_continue().map_err(|e| match e {
            sprig_git::Error::RebaseConflict(_) => Error::RebaseConflict {
                branch: branch.clone(),
                parent: parent.clone(),
            },
            other => Error::Git(other),
        })?;

        restack_children(self.git, self.state, &branch, steps)?;
        Ok(ContinueOutcome::Completed { branch })
    }
}
