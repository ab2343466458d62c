//! Create service: new branches stacked on the current branch.

use sprig_core::{BranchName, Error, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, with_rollback};

/// Service for creating stacked branches.
pub struct CreateService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> CreateService<'a, G, S> {
    /// Create a new create service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Create `name` at HEAD, check it out and track it under the current
    /// branch. Returns the parent.
    ///
    /// With `message`, staged changes (all changes if `stage_all`) are
    /// committed on the new branch. A failed commit removes the new branch
    /// and its tracking entry again.
    pub fn create(&self, name: &str, message: Option<&str>, stage_all: bool) -> Result<String> {
        let name = BranchName::new(name)?;
        let name = name.as_str();
        if self.git.branch_exists(name) {
            return Err(Error::BranchExists(name.into()));
        }

        let parent = current_branch(self.git)?;
        let mut metadata = self.state.load_metadata()?;

        self.git.checkout_new_branch(name, &parent)?;
        metadata.track(name, &parent)?;
        self.state.save_metadata(&metadata)?;
        tracing::info!(branch = name, parent = %parent, "created");

        let Some(message) = message else {
            return Ok(parent);
        };

        if stage_all {
            self.git.stage_all()?;
        }
        if !self.git.has_staged_changes()? {
            return Ok(parent);
        }

        if let Err(e) = self.git.commit(message) {
            let rollback = self.undo_create(name, &parent, &mut metadata);
            return Err(with_rollback(e.into(), rollback));
        }
        Ok(parent)
    }

    fn undo_create(
        &self,
        name: &str,
        parent: &str,
        metadata: &mut sprig_core::Metadata,
    ) -> Result<()> {
        self.git.checkout(parent)?;
        self.git.delete_branch(name, true)?;
        metadata.untrack(name);
        self.state.save_metadata(metadata)
    }
}
