//! Repository wrapper providing high-level git operations.
//!
//! Read-only inspection goes through git2. Anything that rewrites the working
//! tree (checkout, rebase, merge, cherry-pick) shells out to the `git` binary
//! so hooks, conflict markers and rebase state match what users expect.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use git2::{BranchType, Oid, RepositoryState, Sort};

use crate::error::{Error, Result};
use crate::traits::{CommitSummary, GitOps};

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| Error::NotARepository)?;
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Directory shared by all worktrees of this repository.
    ///
    /// sprig keeps its state here so linked worktrees see the same stack.
    ///
    /// # Errors
    /// Returns error if git cannot report the common directory.
    pub fn common_dir(&self) -> Result<PathBuf> {
        let dir = PathBuf::from(self.run_git(&["rev-parse", "--git-common-dir"])?);
        if dir.is_absolute() {
            Ok(dir)
        } else {
            Ok(self.command_dir().join(dir))
        }
    }

    /// Get the current repository state.
    #[must_use]
    pub fn state(&self) -> RepositoryState {
        self.inner.state()
    }

    /// Directory git subprocesses run in.
    fn command_dir(&self) -> &Path {
        self.inner.workdir().unwrap_or_else(|| self.inner.path())
    }

    /// Run git with captured output, returning trimmed stdout.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(args = %args.join(" "), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(self.command_dir())
            .stdin(Stdio::null())
            .output()?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        tracing::debug!(args = %args.join(" "), %stderr, "git failed");
        Err(Error::CommandFailed {
            command: args.join(" "),
            stderr,
        })
    }

    /// Run git attached to the user's terminal.
    fn run_git_interactive(&self, args: &[&str]) -> Result<()> {
        tracing::debug!(args = %args.join(" "), "running interactive git");
        let status = Command::new("git")
            .args(args)
            .current_dir(self.command_dir())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: args.join(" "),
                stderr: format!("exited with {status}"),
            })
        }
    }

    /// Files with unresolved conflicts in the index.
    fn conflicting_files(&self) -> Vec<String> {
        self.run_git(&["diff", "--name-only", "--diff-filter=U"])
            .map(|out| out.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Turn a failed rebase into a conflict or a plain failure.
    fn classify_rebase_failure(&self, err: Error) -> Error {
        if self.is_rebasing() {
            Error::RebaseConflict(self.conflicting_files())
        } else {
            match err {
                Error::CommandFailed { stderr, .. } => Error::RebaseFailed(stderr),
                other => other,
            }
        }
    }

    fn resolve(&self, rev: &str) -> Result<Oid> {
        let object = self
            .inner
            .revparse_single(rev)
            .map_err(|_| Error::RefNotFound(rev.into()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| Error::RefNotFound(rev.into()))?;
        Ok(commit.id())
    }
}

impl GitOps for Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.inner.head().map_err(|_| Error::DetachedHead)?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }

        head.shorthand().map(String::from).ok_or(Error::DetachedHead)
    }

    fn is_rebasing(&self) -> bool {
        matches!(
            self.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
        )
    }

    fn rebasing_branch(&self) -> Option<String> {
        ["rebase-merge", "rebase-apply"].iter().find_map(|dir| {
            let path = self.git_dir().join(dir).join("head-name");
            std::fs::read_to_string(path)
                .ok()?
                .trim()
                .strip_prefix("refs/heads/")
                .map(String::from)
        })
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let branches = self.inner.branches(Some(BranchType::Local))?;

        let mut names: Vec<String> = branches
            .filter_map(std::result::Result::ok)
            .filter_map(|(b, _)| b.name().ok().flatten().map(String::from))
            .collect();
        names.sort();

        Ok(names)
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.inner.find_branch(name, BranchType::Local).is_ok()
    }

    fn create_branch_at(&self, name: &str, start: &str) -> Result<()> {
        let oid = self.resolve(start)?;
        let commit = self.inner.find_commit(oid)?;
        self.inner.branch(name, &commit, false)?;
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        if !self.branch_exists(branch) {
            return Err(Error::BranchNotFound(branch.into()));
        }
        self.run_git(&["checkout", "--quiet", branch])?;
        Ok(())
    }

    fn checkout_new_branch(&self, name: &str, start: &str) -> Result<()> {
        self.run_git(&["checkout", "--quiet", "-b", name, start])?;
        Ok(())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_git(&["branch", flag, name])?;
        Ok(())
    }

    fn rename_branch(&self, old: &str, new: &str) -> Result<()> {
        self.run_git(&["branch", "-m", old, new])?;
        Ok(())
    }

    fn commit_ref(&self, rev: &str) -> Result<Oid> {
        self.resolve(rev)
    }

    fn merge_base(&self, one: &str, two: &str) -> Result<Oid> {
        let a = self.resolve(one)?;
        let b = self.resolve(two)?;
        Ok(self.inner.merge_base(a, b)?)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let a = self.resolve(ancestor)?;
        let d = self.resolve(descendant)?;
        if a == d {
            return Ok(true);
        }
        Ok(self.inner.graph_descendant_of(d, a)?)
    }

    fn commit_summary(&self, rev: &str) -> Result<CommitSummary> {
        let oid = self.resolve(rev)?;
        let commit = self.inner.find_commit(oid)?;
        Ok(CommitSummary::new(oid, commit.message().unwrap_or_default()))
    }

    fn commits_between(&self, base: &str, tip: &str) -> Result<Vec<CommitSummary>> {
        let base = self.resolve(base)?;
        let tip = self.resolve(tip)?;

        let mut revwalk = self.inner.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(tip)?;
        revwalk.hide(base)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.inner.find_commit(oid)?;
            commits.push(CommitSummary::new(oid, commit.message().unwrap_or_default()));
        }
        Ok(commits)
    }

    fn is_merged_into(&self, branch: &str, target: &str) -> Result<bool> {
        let merged = self.run_git(&[
            "branch",
            "--merged",
            target,
            "--format=%(refname:short)",
        ])?;
        Ok(merged.lines().any(|line| line.trim() == branch))
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.run_git(&["status", "--porcelain"])?.is_empty())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.run_git(&["diff", "--cached", "--name-only"])?.is_empty())
    }

    fn has_unstaged_changes(&self) -> Result<bool> {
        Ok(!self.run_git(&["diff", "--name-only"])?.is_empty())
    }

    fn stage_all(&self) -> Result<()> {
        self.run_git(&["add", "-A"])?;
        Ok(())
    }

    fn stage_pathspec(&self, pattern: &str) -> Result<()> {
        self.run_git(&["add", "--", pattern])?;
        Ok(())
    }

    fn stage_interactive(&self) -> Result<()> {
        self.run_git_interactive(&["add", "--patch"])
    }

    fn unstage_all(&self) -> Result<()> {
        self.run_git(&["reset", "--quiet", "HEAD"])?;
        Ok(())
    }

    fn discard_unstaged(&self) -> Result<()> {
        self.run_git(&["checkout", "--", "."])?;
        self.run_git(&["clean", "-fd"])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_git(&["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    fn commit_amend(&self, message: Option<&str>) -> Result<()> {
        match message {
            Some(message) => self.run_git(&["commit", "--quiet", "--amend", "-m", message])?,
            None => self.run_git(&["commit", "--quiet", "--amend", "--no-edit"])?,
        };
        Ok(())
    }

    fn merge_squash(&self, branch: &str) -> Result<()> {
        self.run_git(&["merge", "--squash", branch])?;
        Ok(())
    }

    fn merge_ff_only(&self, rev: &str) -> Result<()> {
        self.run_git(&["merge", "--ff-only", "--quiet", rev])?;
        Ok(())
    }

    fn cherry_pick_no_commit(&self, base: &str, tip: &str) -> Result<()> {
        let range = format!("{base}..{tip}");
        self.run_git(&["cherry-pick", "-n", &range])?;
        Ok(())
    }

    fn cherry_pick_abort(&self) -> Result<()> {
        self.run_git(&["cherry-pick", "--abort"])?;
        Ok(())
    }

    fn rebase(&self, branch: &str, onto: &str) -> Result<()> {
        self.run_git(&["rebase", "--quiet", onto, branch])
            .map(|_| ())
            .map_err(|e| self.classify_rebase_failure(e))
    }

    fn rebase_onto_from(&self, branch: &str, onto: &str, upstream: &str) -> Result<()> {
        self.run_git(&["rebase", "--quiet", "--onto", onto, upstream, branch])
            .map(|_| ())
            .map_err(|e| self.classify_rebase_failure(e))
    }

    fn rebase_abort(&self) -> Result<()> {
        self.run_git(&["rebase", "--abort"])?;
        Ok(())
    }

    fn rebase_continue(&self) -> Result<()> {
        self.run_git(&["-c", "core.editor=true", "rebase", "--continue"])
            .map(|_| ())
            .map_err(|e| self.classify_rebase_failure(e))
    }

    fn fetch_remote(&self, remote: &str) -> Result<()> {
        self.run_git(&["fetch", "--prune", "--quiet", remote])?;
        Ok(())
    }

    fn has_remote_branch(&self, branch: &str, remote: &str) -> bool {
        self.inner
            .find_branch(&format!("{remote}/{branch}"), BranchType::Remote)
            .is_ok()
    }

    fn reset_branch(&self, branch: &str, rev: &str) -> Result<()> {
        if self.current_branch().ok().as_deref() == Some(branch) {
            self.run_git(&["reset", "--hard", "--quiet", rev])?;
        } else {
            self.run_git(&["branch", "-f", branch, rev])?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_test_repo() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();

        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Sprig Test").unwrap();
            config.set_str("user.email", "test@sprig.dev").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();

            let sig = repo.signature().unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap();
        }

        let wrapped = Repository { inner: repo };
        (temp, wrapped)
    }

    fn commit_file(temp: &TempDir, repo: &Repository, name: &str, content: &str) {
        fs::write(temp.path().join(name), content).unwrap();
        repo.stage_all().unwrap();
        repo.commit(&format!("add {name}")).unwrap();
    }

    #[test]
    fn test_current_branch() {
        let (_temp, repo) = init_test_repo();
        let branch = repo.current_branch().unwrap();
        assert!(branch == "main" || branch == "master");
    }

    #[test]
    fn test_create_and_checkout_branch() {
        let (_temp, repo) = init_test_repo();

        repo.create_branch_at("feature/test", "HEAD").unwrap();
        assert!(repo.branch_exists("feature/test"));

        repo.checkout("feature/test").unwrap();
        assert_eq!(repo.current_branch().unwrap(), "feature/test");
    }

    #[test]
    fn test_checkout_missing_branch() {
        let (_temp, repo) = init_test_repo();
        let err = repo.checkout("nope").unwrap_err();
        assert!(matches!(err, Error::BranchNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_is_clean() {
        let (temp, repo) = init_test_repo();

        assert!(repo.is_clean().unwrap());

        fs::write(temp.path().join("new_file.txt"), "content").unwrap();
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_list_branches_sorted() {
        let (_temp, repo) = init_test_repo();

        repo.create_branch_at("feature/b", "HEAD").unwrap();
        repo.create_branch_at("feature/a", "HEAD").unwrap();

        let branches = repo.list_branches().unwrap();
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0], "feature/a");
        assert_eq!(branches[1], "feature/b");
    }

    #[test]
    fn test_commits_between_oldest_first() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "one.txt", "1");
        commit_file(&temp, &repo, "two.txt", "2");

        let commits = repo.commits_between(&trunk, "feature").unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].summary, "add one.txt");
        assert_eq!(commits[1].summary, "add two.txt");
        assert_eq!(commits[0].short_id.len(), 7);
    }

    #[test]
    fn test_merge_base_and_ancestry() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();
        let root = repo.commit_ref(&trunk).unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "f.txt", "f");
        repo.checkout(&trunk).unwrap();
        commit_file(&temp, &repo, "t.txt", "t");

        assert_eq!(repo.merge_base("feature", &trunk).unwrap(), root);
        assert!(!repo.is_ancestor(&trunk, "feature").unwrap());
        assert!(repo.is_ancestor(&root.to_string(), "feature").unwrap());
    }

    #[test]
    fn test_rebase_moves_branch() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "f.txt", "f");
        repo.checkout(&trunk).unwrap();
        commit_file(&temp, &repo, "t.txt", "t");
        let trunk_tip = repo.commit_ref(&trunk).unwrap();

        repo.rebase("feature", &trunk).unwrap();
        assert_eq!(repo.merge_base("feature", &trunk).unwrap(), trunk_tip);
        assert_eq!(repo.current_branch().unwrap(), "feature");
    }

    #[test]
    fn test_rebase_conflict_reports_files() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "same.txt", "feature side");
        repo.checkout(&trunk).unwrap();
        commit_file(&temp, &repo, "same.txt", "trunk side");

        let err = repo.rebase("feature", &trunk).unwrap_err();
        match err {
            Error::RebaseConflict(files) => assert_eq!(files, vec!["same.txt".to_string()]),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(repo.is_rebasing());
        assert_eq!(repo.rebasing_branch().as_deref(), Some("feature"));

        repo.rebase_abort().unwrap();
        assert_eq!(repo.rebasing_branch(), None);
        assert!(!repo.is_rebasing());
    }

    #[test]
    fn test_unstaged_changes_and_amend() {
        let (temp, repo) = init_test_repo();
        commit_file(&temp, &repo, "notes.txt", "first");
        let before = repo.commit_ref("HEAD").unwrap();

        fs::write(temp.path().join("notes.txt"), "second").unwrap();
        assert!(repo.has_unstaged_changes().unwrap());
        assert!(!repo.has_staged_changes().unwrap());

        repo.stage_all().unwrap();
        assert!(!repo.has_unstaged_changes().unwrap());
        repo.commit_amend(None).unwrap();

        let amended = repo.commit_summary("HEAD").unwrap();
        assert_ne!(amended.oid, before);
        assert_eq!(amended.summary, "add notes.txt");

        repo.commit_amend(Some("Rewrite notes")).unwrap();
        assert_eq!(repo.commit_summary("HEAD").unwrap().summary, "Rewrite notes");
        assert_eq!(repo.commits_between(&before.to_string(), "HEAD").unwrap().len(), 1);
    }

    #[test]
    fn test_rename_and_delete_branch() {
        let (_temp, repo) = init_test_repo();

        repo.create_branch_at("old", "HEAD").unwrap();
        repo.rename_branch("old", "new").unwrap();
        assert!(!repo.branch_exists("old"));
        assert!(repo.branch_exists("new"));

        repo.delete_branch("new", true).unwrap();
        assert!(!repo.branch_exists("new"));
    }

    #[test]
    fn test_squash_merge_stages_changes() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "f.txt", "f");
        repo.checkout(&trunk).unwrap();

        assert!(!repo.has_staged_changes().unwrap());
        repo.merge_squash("feature").unwrap();
        assert!(repo.has_staged_changes().unwrap());
    }

    #[test]
    fn test_reset_branch_not_checked_out() {
        let (temp, repo) = init_test_repo();
        let trunk = repo.current_branch().unwrap();
        let root = repo.commit_ref(&trunk).unwrap();

        repo.checkout_new_branch("feature", &trunk).unwrap();
        commit_file(&temp, &repo, "f.txt", "f");
        repo.checkout(&trunk).unwrap();

        repo.reset_branch("feature", &root.to_string()).unwrap();
        assert_eq!(repo.commit_ref("feature").unwrap(), root);
    }

    #[test]
    fn test_common_dir_is_git_dir_for_plain_repo() {
        let (temp, repo) = init_test_repo();
        let common = repo.common_dir().unwrap().canonicalize().unwrap();
        let expected = temp.path().join(".git").canonicalize().unwrap();
        assert_eq!(common, expected);
    }

    #[test]
    fn test_common_dir_shared_by_linked_worktree() {
        let (temp, repo) = init_test_repo();
        let outside = TempDir::new().unwrap();
        let tree = outside.path().join("linked");
        let tree_arg = tree.to_str().unwrap();
        repo.run_git(&["worktree", "add", "--quiet", "-b", "side", tree_arg])
            .unwrap();

        let linked = Repository::open(&tree).unwrap();
        let expected = temp.path().join(".git").canonicalize().unwrap();

        assert_eq!(linked.current_branch().unwrap(), "side");
        assert_ne!(linked.git_dir().canonicalize().unwrap(), expected);
        assert_eq!(linked.common_dir().unwrap().canonicalize().unwrap(), expected);
    }
}
