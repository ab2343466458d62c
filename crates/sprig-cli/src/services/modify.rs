//! Modify service: amend the current branch, or add a commit to it, and
//! restack everything above it.

use sprig_core::{Error, Prompter, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::commit::{Staging, ask_message};
use super::{current_branch, load_graph, restack_children};

/// Options for one modify run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyOptions {
    /// Add a new commit instead of amending.
    pub new_commit: bool,
    pub staging: Staging,
    /// Message for the commit; an amend keeps the old one when `None`.
    pub message: Option<String>,
}

/// What modify did to the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOutcome {
    NothingToCommit,
    Amended,
    /// A new commit was added. `forced` when the branch had no commit of its
    /// own to amend.
    Committed { forced: bool },
}

/// Service for modify with trait-based dependencies.
pub struct ModifyService<'a, G: GitOps, S: StateStore, P: Prompter> {
    git: &'a G,
    state: &'a S,
    prompter: &'a P,
}

impl<'a, G: GitOps, S: StateStore, P: Prompter> ModifyService<'a, G, S, P> {
    /// Create a new modify service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S, prompter: &'a P) -> Self {
        Self {
            git,
            state,
            prompter,
        }
    }

    /// Fold staged changes into the current branch, then restack its
    /// descendants onto the new tip.
    ///
    /// A branch with no commits over its parent always gets a new commit,
    /// since amending would rewrite the parent's tip. New commits without a
    /// message ask for one.
    ///
    /// # Errors
    /// Returns [`Error::UnstagedChanges`] when tracked files changed but
    /// nothing asked for them to be staged, and the first conflict while
    /// restacking descendants.
    pub fn run(&self, opts: &ModifyOptions, steps: &mut Vec<RestackStep>) -> Result<ModifyOutcome> {
        let (trunk, _, graph) = load_graph(self.git, self.state)?;
        let branch = current_branch(self.git)?;

        if branch == trunk {
            return Err(Error::InvalidOperation(format!(
                "cannot modify trunk '{trunk}'"
            )));
        }
        if !graph.contains(&branch) {
            return Err(Error::NotTracked(branch));
        }

        let base = graph.parent(&branch).unwrap_or(trunk.as_str());
        let has_own_commits = !self.git.commits_between(base, &branch)?.is_empty();
        let new_commit = opts.new_commit || !has_own_commits;

        if opts.staging == Staging::Index && self.git.has_unstaged_changes()? {
            return Err(Error::UnstagedChanges);
        }
        opts.staging.apply(self.git)?;
        if !self.git.has_staged_changes()? {
            return Ok(ModifyOutcome::NothingToCommit);
        }

        let outcome = if new_commit {
            let message = match &opts.message {
                Some(message) => message.clone(),
                None => ask_message(self.prompter)?,
            };
            self.git.commit(&message)?;
            ModifyOutcome::Committed {
                forced: !opts.new_commit,
            }
        } else {
            self.git.commit_amend(opts.message.as_deref())?;
            ModifyOutcome::Amended
        };
        tracing::info!(branch = %branch, ?outcome, "modified");

        restack_children(self.git, self.state, &branch, steps)?;
        Ok(outcome)
    }
}
