//! Track service: adding existing branches to the stack.

use sprig_core::{Error, Result, StateStore};
use sprig_git::GitOps;

/// Service for track operations with trait-based dependencies.
pub struct TrackService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> TrackService<'a, G, S> {
    /// Create a new track service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Branches that could become the parent of `branch`, with a short
    /// description for each (`(trunk)` or `(parent: x)`).
    ///
    /// Trunk is listed first.
    pub fn parent_candidates(&self, branch: &str) -> Result<(Vec<String>, Vec<String>)> {
        let trunk = self.state.trunk()?;
        let metadata = self.state.load_metadata()?;

        let mut options = vec![trunk.clone()];
        options.extend(
            self.git
                .list_branches()?
                .into_iter()
                .filter(|b| b != branch && *b != trunk),
        );

        let descriptions = options
            .iter()
            .map(|option| {
                if *option == trunk {
                    "(trunk)".to_string()
                } else {
                    metadata
                        .parent(option)
                        .map(|p| format!("(parent: {p})"))
                        .unwrap_or_default()
                }
            })
            .collect();

        Ok((options, descriptions))
    }

    /// Start tracking `branch` with `parent` as its parent.
    pub fn track(&self, branch: &str, parent: &str) -> Result<()> {
        let trunk = self.state.trunk()?;
        if branch == trunk {
            return Err(Error::InvalidOperation(format!(
                "'{trunk}' is trunk and cannot be tracked"
            )));
        }
        if !self.git.branch_exists(branch) {
            return Err(Error::BranchNotFound(branch.into()));
        }
        if !self.git.branch_exists(parent) {
            return Err(Error::BranchNotFound(parent.into()));
        }
        if branch == parent {
            return Err(Error::InvalidOperation(format!(
                "'{branch}' cannot be its own parent"
            )));
        }

        let mut metadata = self.state.load_metadata()?;
        if metadata.would_create_cycle(branch, parent) {
            return Err(Error::CycleWouldForm {
                branch: branch.into(),
                target: parent.into(),
            });
        }
        metadata.track(branch, parent)?;
        self.state.save_metadata(&metadata)?;

        tracing::info!(branch, parent, "tracked");
        Ok(())
    }
}
