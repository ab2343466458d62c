//! Rename service.

use sprig_core::{BranchName, Error, Result, StateStore};
use sprig_git::GitOps;

use super::with_rollback;

/// Outcome of a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameResult {
    /// The new name equals the old one.
    Unchanged,
    Renamed {
        old: String,
        new: String,
        tracked: bool,
        /// Children repointed at the new name.
        children: Vec<String>,
    },
}

/// Service for rename operations with trait-based dependencies.
pub struct RenameService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> RenameService<'a, G, S> {
    /// Create a new rename service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Rename `old` to `new`, carrying its metadata entry and children.
    ///
    /// The git ref is renamed first; if saving metadata then fails the ref is
    /// renamed back.
    pub fn rename(&self, old: &str, new: &str) -> Result<RenameResult> {
        let trunk = self.state.trunk()?;
        if old == trunk {
            return Err(Error::InvalidOperation(format!(
                "cannot rename trunk '{trunk}'"
            )));
        }
        if !self.git.branch_exists(old) {
            return Err(Error::BranchNotFound(old.into()));
        }
        let new = BranchName::new(new)?;
        if new == old {
            return Ok(RenameResult::Unchanged);
        }
        if self.git.branch_exists(&new) {
            return Err(Error::BranchExists(new.into_inner()));
        }

        let mut metadata = self.state.load_metadata()?;
        let tracked = metadata.is_tracked(old);
        let has_children = !metadata.children(old).is_empty();

        self.git.rename_branch(old, &new)?;
        tracing::info!(old, new = %new, "renamed branch");

        let children = if tracked || has_children {
            let children = metadata.rename(old, &new);
            if let Err(e) = self.state.save_metadata(&metadata) {
                let rollback = self.git.rename_branch(&new, old).map_err(Error::from);
                return Err(with_rollback(e, rollback));
            }
            children
        } else {
            Vec::new()
        };

        Ok(RenameResult::Renamed {
            old: old.into(),
            new: new.into_inner(),
            tracked,
            children,
        })
    }
}
