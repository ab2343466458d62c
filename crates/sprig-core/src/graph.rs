//! In-memory branch forest.
//!
//! A [`BranchGraph`] is built from [`Metadata`] intersected with the branches
//! that exist in the repository. Nodes live in a map keyed by name and refer
//! to each other by name. The graph is never edited: callers rebuild it after
//! any structural change.

use std::collections::{HashMap, HashSet};

use sprig_git::{GitOps, Oid};

use crate::error::{Error, Result};
use crate::metadata::Metadata;

/// One branch in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Branch name.
    pub name: String,
    /// Parent in the graph; `None` for trunk and for branches whose parent is gone.
    pub parent: Option<String>,
    /// Children, sorted by name.
    pub children: Vec<String>,
    /// Whether this is the trunk node.
    pub is_trunk: bool,
    /// Whether this branch is checked out.
    pub is_current: bool,
    /// Tip commit, when it could be resolved.
    pub commit: Option<Oid>,
}

impl Node {
    fn new(name: &str, is_trunk: bool, current: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            is_trunk,
            is_current: current == Some(name),
            commit: None,
        }
    }
}

/// Branch forest rooted at trunk.
#[derive(Debug, Clone)]
pub struct BranchGraph {
    trunk: String,
    nodes: HashMap<String, Node>,
    current: Option<String>,
}

impl BranchGraph {
    /// Build a graph from the live branch list and metadata.
    ///
    /// Entries for branches that no longer exist are skipped. A branch whose
    /// parent is missing becomes a parentless root.
    ///
    /// # Errors
    /// Returns [`Error::TrunkMissing`] if `trunk` is not in `branches`.
    pub fn build(
        branches: &[String],
        trunk: &str,
        metadata: &Metadata,
        current: Option<&str>,
    ) -> Result<Self> {
        let live: HashSet<&str> = branches.iter().map(String::as_str).collect();
        if !live.contains(trunk) {
            return Err(Error::TrunkMissing(trunk.into()));
        }

        let mut nodes = HashMap::new();
        nodes.insert(trunk.to_string(), Node::new(trunk, true, current));

        for name in metadata.names() {
            if name != trunk && live.contains(name) {
                nodes.insert(name.to_string(), Node::new(name, false, current));
            }
        }

        let mut links: Vec<(String, String)> = nodes
            .keys()
            .filter(|name| name.as_str() != trunk)
            .filter_map(|name| {
                let parent = metadata.parent(name)?;
                nodes
                    .contains_key(parent)
                    .then(|| (name.clone(), parent.to_string()))
            })
            .collect();
        links.sort();

        for (child, parent) in links {
            if let Some(node) = nodes.get_mut(&child) {
                node.parent = Some(parent.clone());
            }
            if let Some(node) = nodes.get_mut(&parent) {
                node.children.push(child);
            }
        }

        Ok(Self {
            trunk: trunk.into(),
            nodes,
            current: current.map(String::from),
        })
    }

    /// Build a graph from the repository, resolving each node's tip.
    ///
    /// # Errors
    /// Returns error if branches cannot be listed or trunk is missing.
    pub fn from_repo<G: GitOps>(git: &G, trunk: &str, metadata: &Metadata) -> Result<Self> {
        let branches = git.list_branches()?;
        let current = git.current_branch().ok();
        let mut graph = Self::build(&branches, trunk, metadata, current.as_deref())?;

        for node in graph.nodes.values_mut() {
            node.commit = git.commit_ref(&node.name).ok();
        }
        Ok(graph)
    }

    /// Name of the trunk branch.
    #[must_use]
    pub fn trunk(&self) -> &str {
        &self.trunk
    }

    /// Checked-out branch when the graph was built.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether `name` is trunk.
    #[must_use]
    pub fn is_trunk(&self, name: &str) -> bool {
        self.trunk == name
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Whether `name` is in the graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Parent of `name` in the graph.
    #[must_use]
    pub fn parent(&self, name: &str) -> Option<&str> {
        self.nodes.get(name)?.parent.as_deref()
    }

    /// Children of `name`, sorted. Empty if `name` is unknown.
    #[must_use]
    pub fn children(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    /// Path `[trunk, .., name]`.
    ///
    /// `None` if `name` is unknown, not connected to trunk, or sits on a cycle.
    #[must_use]
    pub fn find_path(&self, name: &str) -> Option<Vec<String>> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.nodes.get(name)?;

        loop {
            if !seen.insert(current.name.as_str()) {
                return None;
            }
            path.push(current.name.clone());
            match &current.parent {
                Some(parent) => current = self.nodes.get(parent)?,
                None => break,
            }
        }

        if !current.is_trunk {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Distance from trunk (trunk is 0).
    #[must_use]
    pub fn depth(&self, name: &str) -> Option<usize> {
        self.find_path(name).map(|path| path.len() - 1)
    }

    /// Every non-trunk node, parents before children.
    ///
    /// Pre-order from trunk with children in name order, followed by the
    /// subtrees of any roots that lost their parent.
    #[must_use]
    pub fn topological_order(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        visited.insert(self.trunk.clone());

        for child in self.children(&self.trunk) {
            self.pre_order(child, &mut visited, &mut order);
        }

        let mut orphans: Vec<&Node> = self
            .nodes
            .values()
            .filter(|node| !node.is_trunk && node.parent.is_none())
            .collect();
        orphans.sort_by(|a, b| a.name.cmp(&b.name));
        for orphan in orphans {
            self.pre_order(&orphan.name, &mut visited, &mut order);
        }

        order
    }

    fn pre_order(&self, name: &str, visited: &mut HashSet<String>, order: &mut Vec<String>) {
        if !visited.insert(name.to_string()) {
            return;
        }
        order.push(name.to_string());
        for child in self.children(name) {
            self.pre_order(child, visited, order);
        }
    }

    /// Check the parent links for cycles.
    ///
    /// # Errors
    /// Returns [`Error::CycleDetected`] naming the branch that closes a cycle.
    pub fn validate(&self) -> Result<()> {
        let mut done: HashSet<&str> = HashSet::new();

        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();

        for start in names {
            let mut on_path: HashSet<&str> = HashSet::new();
            let mut current = Some(start);

            while let Some(name) = current {
                if done.contains(name) {
                    break;
                }
                if !on_path.insert(name) {
                    return Err(Error::CycleDetected(name.into()));
                }
                current = self.parent(name);
            }
            done.extend(on_path);
        }
        Ok(())
    }

    /// Whether `candidate` is strictly below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
        let mut visited = HashSet::new();
        self.descends(ancestor, candidate, &mut visited)
    }

    fn descends<'a>(
        &'a self,
        name: &'a str,
        candidate: &str,
        visited: &mut HashSet<&'a str>,
    ) -> bool {
        if !visited.insert(name) {
            return false;
        }
        self.children(name)
            .iter()
            .any(|child| child == candidate || self.descends(child, candidate, visited))
    }

    /// All descendants of `name`, parents before children.
    #[must_use]
    pub fn descendants(&self, name: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        visited.insert(name.to_string());
        let mut order = Vec::new();
        for child in self.children(name) {
            self.pre_order(child, &mut visited, &mut order);
        }
        order
    }
}
