//! Mock implementations for testing services.
//!
//! These mocks implement the traits from sprig-git and sprig-core so service
//! logic can be exercised without real repositories or terminals.
//!
//! `MockGitOps` models just enough of git for stacking: every branch has a
//! tip and a recorded base (the parent tip it was last rebased onto).
//! `merge_base(branch, parent)` answers with that base, so moving a parent's
//! tip makes its children stale, and a rebase moves both base and tip.

#![allow(dead_code, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use sprig_core::{Metadata, Prompter, Result as CoreResult, Settings, StateStore, TrunkConfig};
use sprig_git::{CommitSummary, Error as GitError, GitOps, Oid, Result as GitResult};

fn oid(n: u64) -> Oid {
    Oid::from_str(&format!("{n:040x}")).unwrap()
}

fn failed(command: &str) -> GitError {
    GitError::CommandFailed {
        command: command.to_string(),
        stderr: "mock failure".to_string(),
    }
}

/// Mock implementation of `GitOps` for testing.
pub struct MockGitOps {
    pub current_branch: RefCell<String>,
    pub branches: RefCell<BTreeMap<String, Oid>>,
    pub bases: RefCell<HashMap<String, Oid>>,
    pub remote_branches: RefCell<HashMap<String, Oid>>,
    pub ancestry: RefCell<HashSet<(String, String)>>,
    pub merged: RefCell<HashSet<String>>,
    pub commits: RefCell<HashMap<String, Vec<CommitSummary>>>,
    pub conflicts: RefCell<HashSet<String>>,
    pub failing: RefCell<HashSet<&'static str>>,
    pub is_clean: Cell<bool>,
    pub staged: Cell<bool>,
    pub unstaged: Cell<bool>,
    pub stage_selects: Cell<bool>,
    pub rebasing: RefCell<Option<(String, String)>>,
    pub calls: RefCell<Vec<String>>,
    next_oid: Cell<u64>,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    pub fn new() -> Self {
        let mock = Self {
            current_branch: RefCell::new("main".to_string()),
            branches: RefCell::new(BTreeMap::new()),
            bases: RefCell::new(HashMap::new()),
            remote_branches: RefCell::new(HashMap::new()),
            ancestry: RefCell::new(HashSet::new()),
            merged: RefCell::new(HashSet::new()),
            commits: RefCell::new(HashMap::new()),
            conflicts: RefCell::new(HashSet::new()),
            failing: RefCell::new(HashSet::new()),
            is_clean: Cell::new(true),
            staged: Cell::new(false),
            unstaged: Cell::new(false),
            stage_selects: Cell::new(true),
            rebasing: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            next_oid: Cell::new(1),
        };
        let main = mock.fresh_oid();
        mock.branches.borrow_mut().insert("main".to_string(), main);
        mock
    }

    fn fresh_oid(&self) -> Oid {
        let n = self.next_oid.get();
        self.next_oid.set(n + 1);
        oid(n)
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, op: &'static str) -> GitResult<()> {
        if self.failing.borrow().contains(op) {
            Err(failed(op))
        } else {
            Ok(())
        }
    }

    fn tip(&self, name: &str) -> GitResult<Oid> {
        if let Some(tip) = self.branches.borrow().get(name) {
            return Ok(*tip);
        }
        if let Some(tip) = self.remote_branches.borrow().get(name) {
            return Ok(*tip);
        }
        // Raw commit ids resolve to themselves.
        match Oid::from_str(name) {
            Ok(id) if name.len() == 40 => Ok(id),
            _ => Err(GitError::RefNotFound(name.to_string())),
        }
    }

    /// Add a branch sitting on top of `parent`'s current tip.
    pub fn with_branch_on(self, name: &str, parent: &str) -> Self {
        let base = self.tip(parent).unwrap();
        let tip = self.fresh_oid();
        self.branches.borrow_mut().insert(name.to_string(), tip);
        self.bases.borrow_mut().insert(name.to_string(), base);
        self
    }

    /// Move `name` forward by one commit, leaving its children stale.
    pub fn advance(&self, name: &str) {
        let tip = self.fresh_oid();
        self.branches.borrow_mut().insert(name.to_string(), tip);
    }

    pub fn with_current_branch(self, name: &str) -> Self {
        *self.current_branch.borrow_mut() = name.to_string();
        self
    }

    pub fn with_conflict(self, branch: &str) -> Self {
        self.conflicts.borrow_mut().insert(branch.to_string());
        self
    }

    pub fn with_failure(self, op: &'static str) -> Self {
        self.failing.borrow_mut().insert(op);
        self
    }

    pub fn with_dirty_tree(self) -> Self {
        self.is_clean.set(false);
        self
    }

    /// Modified tracked files that are not staged.
    pub fn with_unstaged_changes(self) -> Self {
        self.is_clean.set(false);
        self.unstaged.set(true);
        self
    }

    pub fn with_staged_changes(self) -> Self {
        self.is_clean.set(false);
        self.staged.set(true);
        self
    }

    pub fn with_remote_branch(self, name: &str, tip: Oid) -> Self {
        self.remote_branches.borrow_mut().insert(name.to_string(), tip);
        self
    }

    pub fn with_ancestor(self, ancestor: &str, descendant: &str) -> Self {
        self.ancestry
            .borrow_mut()
            .insert((ancestor.to_string(), descendant.to_string()));
        self
    }

    pub fn with_merged(self, branch: &str) -> Self {
        self.merged.borrow_mut().insert(branch.to_string());
        self
    }

    pub fn with_commits(self, branch: &str, messages: &[&str]) -> Self {
        let commits = messages
            .iter()
            .map(|m| CommitSummary::new(self.fresh_oid(), m))
            .collect();
        self.commits.borrow_mut().insert(branch.to_string(), commits);
        self
    }

    /// Pathspecs and interactive staging select nothing.
    pub fn with_empty_selection(self) -> Self {
        self.stage_selects.set(false);
        self
    }

    pub fn tip_of(&self, name: &str) -> Oid {
        self.tip(name).unwrap()
    }

    pub fn base_of(&self, name: &str) -> Option<Oid> {
        self.bases.borrow().get(name).copied()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.borrow().contains_key(name)
    }

    pub fn current(&self) -> String {
        self.current_branch.borrow().clone()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }

    /// Calls that start with `prefix`, in order.
    pub fn calls_starting(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn land_rebase(&self, branch: &str, onto: &str) -> GitResult<()> {
        let base = self.tip(onto)?;
        let tip = self.fresh_oid();
        self.bases.borrow_mut().insert(branch.to_string(), base);
        self.branches.borrow_mut().insert(branch.to_string(), tip);
        Ok(())
    }
}

impl GitOps for MockGitOps {
    fn current_branch(&self) -> GitResult<String> {
        if self.rebasing.borrow().is_some() {
            return Err(GitError::DetachedHead);
        }
        Ok(self.current_branch.borrow().clone())
    }

    fn is_rebasing(&self) -> bool {
        self.rebasing.borrow().is_some()
    }

    fn rebasing_branch(&self) -> Option<String> {
        self.rebasing.borrow().as_ref().map(|(branch, _)| branch.clone())
    }

    fn list_branches(&self) -> GitResult<Vec<String>> {
        Ok(self.branches.borrow().keys().cloned().collect())
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.has_branch(name)
    }

    fn create_branch_at(&self, name: &str, start: &str) -> GitResult<()> {
        self.record(format!("branch {name} {start}"));
        self.check("create_branch")?;
        let tip = self.tip(start)?;
        self.branches.borrow_mut().insert(name.to_string(), tip);
        self.bases.borrow_mut().insert(name.to_string(), tip);
        Ok(())
    }

    fn checkout(&self, branch: &str) -> GitResult<()> {
        self.record(format!("checkout {branch}"));
        self.check("checkout")?;
        if !self.has_branch(branch) {
            return Err(GitError::BranchNotFound(branch.to_string()));
        }
        *self.current_branch.borrow_mut() = branch.to_string();
        Ok(())
    }

    fn checkout_new_branch(&self, name: &str, start: &str) -> GitResult<()> {
        self.create_branch_at(name, start)?;
        *self.current_branch.borrow_mut() = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str, _force: bool) -> GitResult<()> {
        self.record(format!("delete {name}"));
        self.check("delete_branch")?;
        if self.current() == name {
            return Err(failed("branch -D (checked out)"));
        }
        self.branches
            .borrow_mut()
            .remove(name)
            .ok_or_else(|| GitError::BranchNotFound(name.to_string()))?;
        self.bases.borrow_mut().remove(name);
        Ok(())
    }

    fn rename_branch(&self, old: &str, new: &str) -> GitResult<()> {
        self.record(format!("rename {old} {new}"));
        self.check("rename_branch")?;
        let tip = self
            .branches
            .borrow_mut()
            .remove(old)
            .ok_or_else(|| GitError::BranchNotFound(old.to_string()))?;
        self.branches.borrow_mut().insert(new.to_string(), tip);
        let base = self.bases.borrow_mut().remove(old);
        if let Some(base) = base {
            self.bases.borrow_mut().insert(new.to_string(), base);
        }
        if self.current() == old {
            *self.current_branch.borrow_mut() = new.to_string();
        }
        Ok(())
    }

    fn commit_ref(&self, rev: &str) -> GitResult<Oid> {
        self.tip(rev)
    }

    fn merge_base(&self, one: &str, two: &str) -> GitResult<Oid> {
        self.tip(one)?;
        let two_tip = self.tip(two)?;
        Ok(self.base_of(one).unwrap_or(two_tip))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> GitResult<bool> {
        self.check("is_ancestor")?;
        if self.tip(ancestor)? == self.tip(descendant)? {
            return Ok(true);
        }
        Ok(self
            .ancestry
            .borrow()
            .contains(&(ancestor.to_string(), descendant.to_string())))
    }

    fn commit_summary(&self, rev: &str) -> GitResult<CommitSummary> {
        let tip = self.tip(rev)?;
        Ok(CommitSummary::new(tip, &format!("tip of {rev}")))
    }

    fn commits_between(&self, _base: &str, tip: &str) -> GitResult<Vec<CommitSummary>> {
        self.tip(tip)?;
        Ok(self.commits.borrow().get(tip).cloned().unwrap_or_default())
    }

    fn is_merged_into(&self, branch: &str, _target: &str) -> GitResult<bool> {
        Ok(self.merged.borrow().contains(branch))
    }

    fn is_clean(&self) -> GitResult<bool> {
        Ok(self.is_clean.get())
    }

    fn has_staged_changes(&self) -> GitResult<bool> {
        Ok(self.staged.get())
    }

    fn has_unstaged_changes(&self) -> GitResult<bool> {
        Ok(self.unstaged.get())
    }

    fn stage_all(&self) -> GitResult<()> {
        self.record("add -A".to_string());
        self.staged.set(true);
        self.unstaged.set(false);
        Ok(())
    }

    fn stage_pathspec(&self, pattern: &str) -> GitResult<()> {
        self.record(format!("add {pattern}"));
        if !self.stage_selects.get() {
            return Err(failed("add"));
        }
        self.staged.set(true);
        Ok(())
    }

    fn stage_interactive(&self) -> GitResult<()> {
        self.record("add --patch".to_string());
        if self.stage_selects.get() {
            self.staged.set(true);
        }
        Ok(())
    }

    fn unstage_all(&self) -> GitResult<()> {
        self.record("reset HEAD".to_string());
        self.staged.set(false);
        Ok(())
    }

    fn discard_unstaged(&self) -> GitResult<()> {
        self.record("discard".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> GitResult<()> {
        self.record(format!("commit {message}"));
        self.check("commit")?;
        let current = self.current();
        self.advance(&current);
        self.staged.set(false);
        Ok(())
    }

    fn commit_amend(&self, message: Option<&str>) -> GitResult<()> {
        match message {
            Some(message) => self.record(format!("commit --amend {message}")),
            None => self.record("commit --amend".to_string()),
        }
        self.check("commit")?;
        let current = self.current();
        self.advance(&current);
        self.staged.set(false);
        Ok(())
    }

    fn merge_squash(&self, branch: &str) -> GitResult<()> {
        self.record(format!("merge --squash {branch}"));
        self.check("merge_squash")?;
        self.staged.set(true);
        Ok(())
    }

    fn merge_ff_only(&self, rev: &str) -> GitResult<()> {
        self.record(format!("merge --ff-only {rev}"));
        self.check("merge_ff_only")?;
        let tip = self.tip(rev)?;
        let current = self.current();
        self.branches.borrow_mut().insert(current, tip);
        Ok(())
    }

    fn cherry_pick_no_commit(&self, base: &str, tip: &str) -> GitResult<()> {
        self.record(format!("cherry-pick -n {base}..{tip}"));
        self.check("cherry_pick")?;
        self.staged.set(true);
        Ok(())
    }

    fn cherry_pick_abort(&self) -> GitResult<()> {
        self.record("cherry-pick --abort".to_string());
        self.staged.set(false);
        Ok(())
    }

    fn rebase(&self, branch: &str, onto: &str) -> GitResult<()> {
        self.record(format!("rebase {branch} {onto}"));
        self.check("rebase")?;
        *self.current_branch.borrow_mut() = branch.to_string();
        if self.conflicts.borrow().contains(branch) {
            *self.rebasing.borrow_mut() = Some((branch.to_string(), onto.to_string()));
            return Err(GitError::RebaseConflict(vec!["conflict.txt".to_string()]));
        }
        self.land_rebase(branch, onto)
    }

    fn rebase_onto_from(&self, branch: &str, onto: &str, upstream: &str) -> GitResult<()> {
        self.record(format!("rebase --onto {onto} {upstream} {branch}"));
        self.check("rebase")?;
        *self.current_branch.borrow_mut() = branch.to_string();
        if self.conflicts.borrow().contains(branch) {
            *self.rebasing.borrow_mut() = Some((branch.to_string(), onto.to_string()));
            return Err(GitError::RebaseConflict(vec!["conflict.txt".to_string()]));
        }
        self.land_rebase(branch, onto)
    }

    fn rebase_abort(&self) -> GitResult<()> {
        self.record("rebase --abort".to_string());
        self.rebasing.borrow_mut().take();
        Ok(())
    }

    fn rebase_continue(&self) -> GitResult<()> {
        self.record("rebase --continue".to_string());
        self.check("rebase_continue")?;
        let Some((branch, onto)) = self.rebasing.borrow_mut().take() else {
            return Err(failed("rebase --continue"));
        };
        self.conflicts.borrow_mut().remove(&branch);
        *self.current_branch.borrow_mut() = branch.clone();
        self.land_rebase(&branch, &onto)
    }

    fn fetch_remote(&self, remote: &str) -> GitResult<()> {
        self.record(format!("fetch {remote}"));
        self.check("fetch")
    }

    fn has_remote_branch(&self, branch: &str, remote: &str) -> bool {
        self.remote_branches
            .borrow()
            .contains_key(&format!("{remote}/{branch}"))
    }

    fn reset_branch(&self, branch: &str, rev: &str) -> GitResult<()> {
        self.record(format!("reset {branch} {rev}"));
        self.check("reset_branch")?;
        let tip = self.tip(rev)?;
        self.branches.borrow_mut().insert(branch.to_string(), tip);
        Ok(())
    }
}

/// Mock implementation of `StateStore` for testing.
pub struct MockStateStore {
    pub config: RefCell<Option<TrunkConfig>>,
    pub metadata: RefCell<Metadata>,
    pub settings: RefCell<Settings>,
    pub sprig_dir: PathBuf,
    pub saves: Cell<usize>,
    /// Successful saves left before every save fails; `None` never fails.
    pub save_budget: Cell<Option<usize>>,
}

impl Default for MockStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            config: RefCell::new(Some(TrunkConfig::new("main"))),
            metadata: RefCell::new(Metadata::new()),
            settings: RefCell::new(Settings::default()),
            sprig_dir: std::env::temp_dir().join("mock-sprig"),
            saves: Cell::new(0),
            save_budget: Cell::new(None),
        }
    }

    pub fn uninitialized() -> Self {
        let store = Self::new();
        *store.config.borrow_mut() = None;
        store
    }

    /// Track `(branch, parent)` pairs.
    pub fn with_tracked(self, pairs: &[(&str, &str)]) -> Self {
        {
            let mut meta = self.metadata.borrow_mut();
            for (branch, parent) in pairs {
                meta.track(branch, parent).unwrap();
            }
        }
        self
    }

    /// Let `n` saves succeed, then fail every later one.
    pub fn failing_saves_after(self, n: usize) -> Self {
        self.save_budget.set(Some(n));
        self
    }

    pub fn parent(&self, branch: &str) -> Option<String> {
        self.metadata.borrow().parent(branch).map(String::from)
    }

    pub fn is_tracked(&self, branch: &str) -> bool {
        self.metadata.borrow().is_tracked(branch)
    }
}

impl StateStore for MockStateStore {
    fn is_initialized(&self) -> bool {
        self.config.borrow().is_some()
    }

    fn init(&self, config: &TrunkConfig) -> CoreResult<()> {
        if let Some(existing) = self.config.borrow().as_ref() {
            return Err(sprig_core::Error::AlreadyInitialized(existing.trunk.clone()));
        }
        *self.config.borrow_mut() = Some(config.clone());
        Ok(())
    }

    fn sprig_dir(&self) -> &Path {
        &self.sprig_dir
    }

    fn load_config(&self) -> CoreResult<TrunkConfig> {
        self.config
            .borrow()
            .clone()
            .ok_or(sprig_core::Error::NotInitialized)
    }

    fn save_config(&self, config: &TrunkConfig) -> CoreResult<()> {
        *self.config.borrow_mut() = Some(config.clone());
        Ok(())
    }

    fn load_metadata(&self) -> CoreResult<Metadata> {
        Ok(self.metadata.borrow().clone())
    }

    fn save_metadata(&self, metadata: &Metadata) -> CoreResult<()> {
        if let Some(left) = self.save_budget.get() {
            if left == 0 {
                return Err(sprig_core::Error::MetadataPersist(
                    "mock save failure".to_string(),
                ));
            }
            self.save_budget.set(Some(left - 1));
        }
        self.saves.set(self.saves.get() + 1);
        *self.metadata.borrow_mut() = metadata.clone();
        Ok(())
    }

    fn load_settings(&self) -> CoreResult<Settings> {
        Ok(self.settings.borrow().clone())
    }
}

/// One scripted answer for [`ScriptedPrompter`].
#[derive(Debug, Clone)]
pub enum Answer {
    Select(String),
    Confirm(bool),
    Input(String),
    Multi(Vec<String>),
    Cancel,
}

/// Prompter that replays answers in order and records each question.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    pub asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            asked: RefCell::new(Vec::new()),
        }
    }

    fn next(&self, message: &str) -> Answer {
        self.asked.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer for prompt: {message}"))
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn select_one(
        &self,
        message: &str,
        _options: &[String],
        _descriptions: Option<&[String]>,
    ) -> CoreResult<Option<String>> {
        match self.next(message) {
            Answer::Select(choice) => Ok(Some(choice)),
            Answer::Cancel => Ok(None),
            other => panic!("expected select answer for {message}, got {other:?}"),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> CoreResult<Option<bool>> {
        match self.next(message) {
            Answer::Confirm(yes) => Ok(Some(yes)),
            Answer::Cancel => Ok(None),
            other => panic!("expected confirm answer for {message}, got {other:?}"),
        }
    }

    fn input(&self, message: &str, _default: Option<&str>) -> CoreResult<Option<String>> {
        match self.next(message) {
            Answer::Input(text) => Ok(Some(text)),
            Answer::Cancel => Ok(None),
            other => panic!("expected input answer for {message}, got {other:?}"),
        }
    }

    fn multi_select(&self, message: &str, _options: &[String]) -> CoreResult<Option<Vec<String>>> {
        match self.next(message) {
            Answer::Multi(choices) => Ok(Some(choices)),
            Answer::Cancel => Ok(None),
            other => panic!("expected multi-select answer for {message}, got {other:?}"),
        }
    }
}
