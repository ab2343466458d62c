//! Persisted parent map of tracked branches.
//!
//! Every tracked branch has exactly one entry naming its parent. Trunk is the
//! implicit root and never has an entry. All mutations here are in memory;
//! callers save through [`crate::StateStore::save_metadata`] after each
//! logical step.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Metadata for one tracked branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMetadata {
    /// Declared parent branch.
    pub parent: String,
    /// Always true for stored entries; kept for document compatibility.
    pub tracked: bool,
    /// When the branch started being tracked.
    pub created: DateTime<Utc>,
}

impl BranchMetadata {
    /// A fresh entry under `parent`.
    #[must_use]
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            tracked: true,
            created: Utc::now(),
        }
    }
}

/// The `metadata.json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Branch name to metadata, kept sorted by name.
    #[serde(default)]
    pub branches: BTreeMap<String, BranchMetadata>,
}

impl Metadata {
    /// Empty metadata.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            branches: BTreeMap::new(),
        }
    }

    /// Whether `branch` has an entry.
    #[must_use]
    pub fn is_tracked(&self, branch: &str) -> bool {
        self.branches.contains_key(branch)
    }

    /// Entry for `branch`.
    #[must_use]
    pub fn get(&self, branch: &str) -> Option<&BranchMetadata> {
        self.branches.get(branch)
    }

    /// Declared parent of `branch`.
    #[must_use]
    pub fn parent(&self, branch: &str) -> Option<&str> {
        self.branches.get(branch).map(|m| m.parent.as_str())
    }

    /// Tracked branches whose parent is `parent`, sorted by name.
    #[must_use]
    pub fn children(&self, parent: &str) -> Vec<String> {
        self.branches
            .iter()
            .filter(|(_, meta)| meta.parent == parent)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of all tracked branches, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    /// Start tracking `branch` under `parent`.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyTracked`] if an entry exists.
    pub fn track(&mut self, branch: &str, parent: &str) -> Result<()> {
        if let Some(existing) = self.branches.get(branch) {
            return Err(Error::AlreadyTracked {
                branch: branch.into(),
                parent: existing.parent.clone(),
            });
        }
        self.branches
            .insert(branch.into(), BranchMetadata::new(parent));
        Ok(())
    }

    /// Stop tracking `branch`, returning its old entry.
    pub fn untrack(&mut self, branch: &str) -> Option<BranchMetadata> {
        self.branches.remove(branch)
    }

    /// Point `branch` at a new parent, returning the previous parent.
    ///
    /// # Errors
    /// Returns [`Error::NotTracked`] if `branch` has no entry.
    pub fn update_parent(&mut self, branch: &str, parent: &str) -> Result<String> {
        let entry = self
            .branches
            .get_mut(branch)
            .ok_or_else(|| Error::NotTracked(branch.into()))?;
        Ok(std::mem::replace(&mut entry.parent, parent.into()))
    }

    /// Re-key `old` as `new` and repoint its children.
    ///
    /// Returns the children that were repointed. An untracked `old` only has
    /// its children repointed.
    pub fn rename(&mut self, old: &str, new: &str) -> Vec<String> {
        if let Some(entry) = self.branches.remove(old) {
            self.branches.insert(new.into(), entry);
        }

        let children = self.children(old);
        for child in &children {
            if let Some(entry) = self.branches.get_mut(child) {
                entry.parent = new.into();
            }
        }
        children
    }

    /// Whether making `parent` the parent of `branch` would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, branch: &str, parent: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(parent);

        while let Some(name) = current {
            if name == branch {
                return true;
            }
            if !seen.insert(name) {
                return false;
            }
            current = self.parent(name);
        }
        false
    }

    /// Tracked names that are not in `live`.
    #[must_use]
    pub fn stale_entries(&self, live: &[String]) -> Vec<String> {
        let live: HashSet<&str> = live.iter().map(String::as_str).collect();
        self.names()
            .filter(|name| !live.contains(name))
            .map(String::from)
            .collect()
    }
}
