//! Info service: read-only questions about a branch's place in the graph.

use sprig_core::{Error, Result, StateStore};
use sprig_git::{CommitSummary, GitOps};

use super::load_graph;

/// Everything `sprig info` shows about one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub is_trunk: bool,
    /// False for branches that exist but are not in the graph; the fields
    /// below are then empty.
    pub tracked: bool,
    pub commit: Option<CommitSummary>,
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Distance from trunk, `None` when the branch is cut off from it.
    pub depth: Option<usize>,
    /// `[trunk, .., name]`, empty when the branch is cut off from trunk.
    pub path: Vec<String>,
}

/// Service for graph queries with trait-based dependencies.
pub struct InfoService<'a, G: GitOps, S: StateStore> {
    git: &'a G,
    state: &'a S,
}

impl<'a, G: GitOps, S: StateStore> InfoService<'a, G, S> {
    /// Create a new info service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S) -> Self {
        Self { git, state }
    }

    /// Recorded parent of `branch`.
    ///
    /// # Errors
    /// Trunk has no parent; untracked branches have none recorded.
    pub fn parent(&self, branch: &str) -> Result<String> {
        let (trunk, _, graph) = load_graph(self.git, self.state)?;
        if branch == trunk {
            return Err(Error::InvalidOperation(format!(
                "'{trunk}' is trunk and has no parent"
            )));
        }
        if !graph.contains(branch) {
            return Err(Error::NotTracked(branch.into()));
        }
        graph
            .parent(branch)
            .map(String::from)
            .ok_or_else(|| Error::MissingParent(branch.into()))
    }

    /// Children of `branch`, in name order.
    pub fn children(&self, branch: &str) -> Result<Vec<String>> {
        let (_, _, graph) = load_graph(self.git, self.state)?;
        if !graph.contains(branch) {
            return Err(Error::NotTracked(branch.into()));
        }
        Ok(graph.children(branch).to_vec())
    }

    /// Summary of `branch`, tracked or not.
    ///
    /// # Errors
    /// Returns [`Error::BranchNotFound`] if the branch does not exist.
    pub fn info(&self, branch: &str) -> Result<BranchInfo> {
        if !self.git.branch_exists(branch) {
            return Err(Error::BranchNotFound(branch.into()));
        }
        let (_, _, graph) = load_graph(self.git, self.state)?;

        let Some(node) = graph.node(branch) else {
            return Ok(BranchInfo {
                name: branch.into(),
                is_trunk: false,
                tracked: false,
                commit: self.git.commit_summary(branch).ok(),
                parent: None,
                children: Vec::new(),
                depth: None,
                path: Vec::new(),
            });
        };

        let commit = node
            .commit
            .and_then(|oid| self.git.commit_summary(&oid.to_string()).ok());
        Ok(BranchInfo {
            name: node.name.clone(),
            is_trunk: node.is_trunk,
            tracked: true,
            commit,
            parent: node.parent.clone(),
            children: node.children.clone(),
            depth: graph.depth(branch),
            path: graph.find_path(branch).unwrap_or_default(),
        })
    }
}
